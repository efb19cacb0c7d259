//! Device file persistence
//!
//! Saving is guarded by the modification time recorded at the last load or
//! save: a file changed by someone else in between is never overwritten.

use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::config::{BUILTIN_PASSWORD_KEY, DeviceSettings};
use crate::device::config::DeviceConfig;
use crate::device::remote::RemoteOutputDevice;
use crate::error::DeviceError;
use crate::storage::{file_exists, file_stem, modified_time, write_atomic};

impl RemoteOutputDevice {
    /// Load a device file with the built-in settings.
    ///
    /// The stored password can only be read back with the built-in key; use
    /// [`load_from_file_with`](Self::load_from_file_with) for devices saved
    /// under a configured `password_key`.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        ignore_exceptions: bool,
    ) -> Result<Option<Self>, DeviceError> {
        Self::load_from_file_with(path, ignore_exceptions, &DeviceSettings::default())
    }

    /// Load a device file using the password key and timeout from `settings`.
    ///
    /// With `ignore_exceptions` a file that cannot be read gives `Ok(None)`
    /// instead of an error.
    pub fn load_from_file_with(
        path: impl AsRef<Path>,
        ignore_exceptions: bool,
        settings: &DeviceSettings,
    ) -> Result<Option<Self>, DeviceError> {
        let path = path.as_ref();
        if settings.password_key == BUILTIN_PASSWORD_KEY {
            warn!(
                "Loading {} with the built-in password key",
                path.display()
            );
        }
        match Self::read_device_file(path, settings) {
            Ok(device) => Ok(Some(device)),
            Err(e) if ignore_exceptions => {
                warn!("Ignoring device file {}: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn read_device_file(path: &Path, settings: &DeviceSettings) -> Result<Self, DeviceError> {
        let read_failed = |reason: String| DeviceError::ReadFailed {
            path: path.to_path_buf(),
            reason,
        };

        let xml = fs::read_to_string(path).map_err(|e| read_failed(e.to_string()))?;
        let config = DeviceConfig::from_xml(&xml).map_err(|e| read_failed(e.to_string()))?;
        let last_modification = modified_time(path).map_err(|e| read_failed(e.to_string()))?;

        let mut device = Self::from_config(config, settings);
        device.config.name = file_stem(path);
        device.file_path = Some(path.to_path_buf());
        device.last_modification = Some(last_modification);

        info!("Loaded device '{}' from {}", device.config.name, path.display());
        Ok(device)
    }

    /// Save the device to `path`, which becomes its backing file
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), DeviceError> {
        let path = path.as_ref();
        if let Some(known) = self.last_modification {
            if file_exists(path) && modified_time(path)? != known {
                warn!("{} changed since it was last read", path.display());
                return Err(DeviceError::Conflict(path.to_path_buf()));
            }
        }

        self.config.name = file_stem(path);
        let xml = self.config.to_xml()?;
        write_atomic(path, xml.as_bytes()).map_err(|e| DeviceError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.file_path = Some(path.to_path_buf());
        self.last_modification = Some(modified_time(path)?);
        info!("Saved device '{}' to {}", self.config.name, path.display());
        Ok(())
    }

    /// Save to the current backing file
    pub fn save(&mut self) -> Result<(), DeviceError> {
        let path = self.file_path.clone().ok_or(DeviceError::NoFilePath)?;
        self.save_to_file(path)
    }
}
