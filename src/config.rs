//! Configuration management for the remote output device
//!
//! Settings that are not part of a device file: the key protecting stored
//! passwords and the network timeout applied to every session.

use config::{Config, Environment, File};
use log::warn;
use serde::Deserialize;
use std::time::Duration;

use crate::crypto::PasswordCipher;

/// Key used when no `password_key` is configured.
pub const BUILTIN_PASSWORD_KEY: &str = "?d_*er)wien?,edl+25.()a,";

const DEFAULT_CONFIG_FILE: &str = "remote-device";
const ENV_PREFIX: &str = "REMOTE_DEVICE";

/// Device-wide settings shared by every device instance
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    /// Secret used to derive the password encryption key
    /// Environment: REMOTE_DEVICE_PASSWORD_KEY
    pub password_key: String,

    /// Connect and I/O timeout for transfer sessions
    /// Environment: REMOTE_DEVICE_CONNECT_TIMEOUT_SECS
    pub connect_timeout_secs: u64,

    /// PBKDF2 rounds for the password key
    pub kdf_iterations: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            password_key: BUILTIN_PASSWORD_KEY.to_string(),
            connect_timeout_secs: 30,
            kdf_iterations: 10_000,
        }
    }
}

impl DeviceSettings {
    /// Load settings from `remote-device.toml` (optional) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from the given file stem (optional) with environment overrides
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("password_key", defaults.password_key)?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("kdf_iterations", defaults.kdf_iterations as i64)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: DeviceSettings = settings.try_deserialize()?;
        config.validate()?;

        if config.password_key == BUILTIN_PASSWORD_KEY {
            warn!("No password_key configured, using the built-in key");
        }
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.password_key.is_empty() {
            return Err(config::ConfigError::Message(
                "password_key cannot be empty".into(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.kdf_iterations == 0 {
            return Err(config::ConfigError::Message(
                "kdf_iterations must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build the password cipher for these settings
    pub fn cipher(&self) -> PasswordCipher {
        PasswordCipher::new(&self.password_key, self.kdf_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_reads_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device-settings.toml");
        fs::write(
            &path,
            "password_key = \"from-file\"\nconnect_timeout_secs = 5\n",
        )
        .unwrap();

        let stem = dir.path().join("device-settings");
        let settings = DeviceSettings::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(settings.password_key, "from-file");
        assert_eq!(settings.connect_timeout(), Duration::from_secs(5));
        assert_eq!(settings.kdf_iterations, 10_000);
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("zero.toml"),
            "connect_timeout_secs = 0\n",
        )
        .unwrap();

        let stem = dir.path().join("zero");
        assert!(DeviceSettings::load_from(stem.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("absent");
        let settings = DeviceSettings::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(settings.connect_timeout_secs, 30);
    }
}
