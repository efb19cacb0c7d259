//! Zip helpers
//!
//! Packs a report result into a single-entry archive before upload.

use log::info;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

use crate::error::DeviceError;

/// Returns `path` if it is free, otherwise the first free `stem (n).ext` beside it.
pub fn unique_file_name(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut index = 1;
    loop {
        let candidate = path.with_file_name(format!("{} ({}){}", stem, index, extension));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

/// Writes `source` into a new zip at `target` under `entry_name`.
///
/// The entry is AES-256 encrypted when a non-empty password is given.
pub fn create_zip(
    source: &Path,
    entry_name: &str,
    target: &Path,
    password: Option<&str>,
) -> Result<(), DeviceError> {
    let mut input = File::open(source)?;
    let mut writer = ZipWriter::new(File::create(target)?);

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    match password.filter(|p| !p.is_empty()) {
        Some(password) => {
            writer.start_file(entry_name, options.with_aes_encryption(AesMode::Aes256, password))?
        }
        None => writer.start_file(entry_name, options)?,
    }

    let bytes = io::copy(&mut input, &mut writer)?;
    writer.finish()?;

    info!(
        "Zipped {} ({} bytes) into {}",
        source.display(),
        bytes,
        target.display()
    );
    Ok(())
}
