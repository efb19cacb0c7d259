//! File system operations
//!
//! Local file helpers used by device persistence.

use log::{error, info};
use std::fs::{self, File, remove_file, rename};
use std::io::{Result, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Last write time of a file
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// File name without its extension
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `contents` to a temporary sibling file, then renames it over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path);
    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()
    });

    if let Err(e) = written {
        error!("Failed to write temporary file {}: {}", temp_path.display(), e);
        let _ = remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = rename(&temp_path, path) {
        error!(
            "Failed to rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        );
        let _ = remove_file(&temp_path);
        return Err(e);
    }

    info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
