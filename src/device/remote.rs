//! Remote output device
//!
//! A device delivers report results to a file server. It owns its session:
//! at most one is open at a time and reopening closes the previous one.

use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::config::DeviceSettings;
use crate::crypto::PasswordCipher;
use crate::device::config::DeviceConfig;
use crate::error::DeviceError;
use crate::error::handlers::error_chain;
use crate::hooks::{self, DEFAULT_SESSION_HOOK, DEFAULT_UPLOAD_HOOK};
use crate::transfer::{self, SessionOptions, TransferSession};

/// Identifier of the device shipped with a fresh repository
pub const DEFAULT_GUID: &str = "c428a6ba-061b-4a47-b9bc-f3f02442ab4b";

pub struct RemoteOutputDevice {
    pub config: DeviceConfig,
    /// Backing file, set by the last load or save
    pub file_path: Option<PathBuf>,
    /// Modification time of the backing file at the last load or save
    pub last_modification: Option<SystemTime>,
    pub information: String,
    pub error: String,
    pub(crate) session: Option<Box<dyn TransferSession>>,
    cipher: PasswordCipher,
    connect_timeout: Duration,
}

impl fmt::Debug for RemoteOutputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteOutputDevice")
            .field("guid", &self.config.guid)
            .field("name", &self.config.name)
            .field("protocol", &self.config.protocol)
            .field("host_name", &self.config.host_name)
            .field("port_number", &self.config.port_number)
            .field("file_path", &self.file_path)
            .field(
                "session",
                &self.session.as_ref().map(|session| session.describe()),
            )
            .finish_non_exhaustive()
    }
}

impl RemoteOutputDevice {
    /// New device with a fresh GUID and default settings
    pub fn create() -> Self {
        let config = DeviceConfig {
            guid: Uuid::new_v4().to_string(),
            ..Default::default()
        };
        Self::from_config(config, &DeviceSettings::default())
    }

    pub(crate) fn from_config(config: DeviceConfig, settings: &DeviceSettings) -> Self {
        Self {
            config,
            file_path: None,
            last_modification: None,
            information: String::new(),
            error: String::new(),
            session: None,
            cipher: settings.cipher(),
            connect_timeout: settings.connect_timeout(),
        }
    }

    /// Use the password key and timeout from `settings`
    pub fn with_settings(mut self, settings: &DeviceSettings) -> Self {
        self.cipher = settings.cipher();
        self.connect_timeout = settings.connect_timeout();
        self
    }

    /// Name shown in device listings
    pub fn full_name(&self) -> String {
        format!("{} (File Server)", self.config.name)
    }

    /// Allowed remote directories, one entry per line or `;`
    pub fn directories_array(&self) -> Vec<String> {
        self.config
            .directories
            .split(['\r', '\n', ';'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Decrypted password.
    ///
    /// A value that cannot be decrypted is returned as stored and the
    /// failure is recorded in [`error`](Self::error).
    pub fn clear_password(&mut self) -> String {
        match self.cipher.decrypt(&self.config.password) {
            Ok(password) => password,
            Err(e) => {
                warn!("Password of device '{}' not decrypted: {}", self.config.name, e);
                self.error = format!("Error during password decryption:{}", e);
                self.config.password.clone()
            }
        }
    }

    /// Encrypt and store `password`; on failure the value is stored as given
    pub fn set_clear_password(&mut self, password: &str) {
        match self.cipher.encrypt(password) {
            Ok(encrypted) => self.config.password = encrypted,
            Err(e) => {
                warn!("Password of device '{}' not encrypted: {}", self.config.name, e);
                self.error = format!("Error during password encryption:{}", e);
                self.config.password = password.to_string();
            }
        }
    }

    /// Session hook body, or the default when none is set
    pub fn session_hook(&self) -> &str {
        if self.config.session_hook.trim().is_empty() {
            DEFAULT_SESSION_HOOK
        } else {
            &self.config.session_hook
        }
    }

    /// Upload hook body, or the default when none is set
    pub fn upload_hook(&self) -> &str {
        if self.config.upload_hook.trim().is_empty() {
            DEFAULT_UPLOAD_HOOK
        } else {
            &self.config.upload_hook
        }
    }

    /// Run the session hook against the device fields
    pub fn session_options(&mut self) -> Result<SessionOptions, DeviceError> {
        let device = SessionOptions {
            protocol: self.config.protocol,
            host_name: self.config.host_name.clone(),
            port_number: self.config.port_number,
            user_name: self.config.user_name.clone(),
            password: self.clear_password(),
            ftp_secure: self.config.ftp_secure,
            timeout: self.connect_timeout,
            ..Default::default()
        };
        Ok(hooks::parse_session_hook(self.session_hook(), &device)?)
    }

    /// Open a session and keep it on the device. Any open session is closed first.
    pub async fn open_session(&mut self) -> Result<&mut dyn TransferSession, DeviceError> {
        self.close_session().await;
        let options = self.session_options()?;
        let session = transfer::open_session(&options).await?;
        info!(
            "Device '{}' opened {}",
            self.config.name,
            session.describe()
        );
        Ok(self.session.insert(session).as_mut())
    }

    /// Close the open session, if any. Close failures are only logged.
    pub async fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!("Closing {} failed: {}", session.describe(), e);
            }
        }
    }

    pub fn has_open_session(&self) -> bool {
        self.session.is_some()
    }

    /// Try to open a session and report the outcome in
    /// [`information`](Self::information) and [`error`](Self::error).
    pub async fn test_connection(&mut self) {
        self.error.clear();
        self.information.clear();

        let result = self.open_session().await.map(|_| ());
        match result {
            Ok(()) => {
                self.information = format!(
                    "The connection to '{}:{}' is successful",
                    self.config.host_name, self.config.port_number
                );
            }
            Err(e) => {
                self.error = error_chain(&e);
                self.information = "Error got testing the connection.".to_string();
            }
        }
        self.close_session().await;
    }

    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.config.host_name.is_empty() {
            return Err(DeviceError::EmptyHost);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Protocol;

    #[test]
    fn test_create_defaults() {
        let device = RemoteOutputDevice::create();
        assert_eq!(device.config.name, "File Server Device");
        assert_eq!(device.full_name(), "File Server Device (File Server)");
        assert!(Uuid::parse_str(&device.config.guid).is_ok());
        assert_ne!(device.config.guid, RemoteOutputDevice::create().config.guid);
        assert!(device.validate().is_ok());
        assert!(!device.has_open_session());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut device = RemoteOutputDevice::create();
        device.config.host_name = String::new();
        let err = device.validate().unwrap_err();
        assert!(matches!(err, DeviceError::EmptyHost));
        assert_eq!(err.to_string(), "The File Server cannot be empty.");
    }

    #[test]
    fn test_validate_only_rejects_empty_host() {
        let mut device = RemoteOutputDevice::create();
        for host in [" ", "\t", "files.local"] {
            device.config.host_name = host.into();
            assert!(device.validate().is_ok(), "host {:?} rejected", host);
        }
    }

    #[test]
    fn test_directories_array() {
        let mut device = RemoteOutputDevice::create();
        device.config.directories = "/reports\r\n /archive ;/tmp\n\n".into();
        assert_eq!(
            device.directories_array(),
            vec!["/reports", "/archive", "/tmp"]
        );
    }

    #[test]
    fn test_password_round_trip() {
        let mut device = RemoteOutputDevice::create();
        device.set_clear_password("s3cret");
        assert_ne!(device.config.password, "s3cret");
        assert_eq!(device.clear_password(), "s3cret");
        assert!(device.error.is_empty());
    }

    #[test]
    fn test_corrupted_password_is_returned_as_stored() {
        let mut device = RemoteOutputDevice::create();
        device.config.password = "not-a-cipher-text".into();
        assert_eq!(device.clear_password(), "not-a-cipher-text");
        assert!(device.error.contains("decryption"));
    }

    #[test]
    fn test_session_options_use_device_fields() {
        let mut device = RemoteOutputDevice::create();
        device.config.protocol = Protocol::Scp;
        device.config.port_number = 2022;
        device.config.user_name = "deploy".into();
        device.set_clear_password("pw");

        let options = device.session_options().unwrap();
        assert_eq!(options.protocol, Protocol::Scp);
        assert_eq!(options.address(), "127.0.0.1:2022");
        assert_eq!(options.user_name, "deploy");
        assert_eq!(options.password, "pw");
        assert_eq!(options.timeout, Duration::from_secs(30));

        device.config.session_hook = "timeout_secs = 3\nhost_name = other".into();
        let options = device.session_options().unwrap();
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.host_name, "other");

        device.config.session_hook = "nonsense".into();
        assert!(matches!(
            device.session_options(),
            Err(DeviceError::Hook(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut device = RemoteOutputDevice::create();
        device.config.port_number = port;
        device.test_connection().await;

        assert_eq!(device.information, "Error got testing the connection.");
        assert!(!device.error.is_empty());
        assert!(!device.has_open_session());
    }
}
