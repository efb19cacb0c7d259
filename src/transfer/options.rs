//! Session and transfer options
//!
//! Everything a transfer session needs to connect and put a file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::device::{FtpSecure, Protocol};

/// Extensions sent as text when the transfer mode is automatic
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "csv", "htm", "html", "xhtml", "xml", "json", "css", "js", "ini", "cfg", "sh", "sql",
    "log",
];

/// Connection settings for one transfer session
#[derive(Clone, PartialEq)]
pub struct SessionOptions {
    pub protocol: Protocol,
    pub host_name: String,
    pub port_number: u16,
    pub user_name: String,
    pub password: String,
    pub ftp_secure: FtpSecure,
    pub accept_any_tls_certificate: bool,
    pub webdav_secure: bool,
    pub ssh_host_key_fingerprint: Option<String>,
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ftp,
            host_name: String::new(),
            port_number: Protocol::Ftp.default_port(),
            user_name: String::new(),
            password: String::new(),
            ftp_secure: FtpSecure::None,
            accept_any_tls_certificate: false,
            webdav_secure: false,
            ssh_host_key_fingerprint: None,
            timeout: Duration::from_secs(30),
        }
    }
}

// Password is left out on purpose so options can be logged.
impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("protocol", &self.protocol)
            .field("host_name", &self.host_name)
            .field("port_number", &self.port_number)
            .field("user_name", &self.user_name)
            .field("ftp_secure", &self.ftp_secure)
            .field("accept_any_tls_certificate", &self.accept_any_tls_certificate)
            .field("webdav_secure", &self.webdav_secure)
            .field("ssh_host_key_fingerprint", &self.ssh_host_key_fingerprint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SessionOptions {
    /// `host:port` of the server
    pub fn address(&self) -> String {
        format!("{}:{}", self.host_name, self.port_number)
    }
}

/// How file content is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// Text for known text extensions, binary otherwise
    #[default]
    Automatic,
    Binary,
    Ascii,
}

impl TransferMode {
    /// Resolve `Automatic` against the local file name
    pub fn resolve(self, local: &Path) -> TransferMode {
        match self {
            TransferMode::Automatic => {
                let is_text = local
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
                    .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()));
                if is_text {
                    TransferMode::Ascii
                } else {
                    TransferMode::Binary
                }
            }
            other => other,
        }
    }
}

impl FromStr for TransferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(TransferMode::Automatic),
            "binary" => Ok(TransferMode::Binary),
            "ascii" => Ok(TransferMode::Ascii),
            other => Err(format!("unknown transfer mode '{}'", other)),
        }
    }
}

/// Options for a single put
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub transfer_mode: TransferMode,
    pub overwrite: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            transfer_mode: TransferMode::Automatic,
            overwrite: true,
        }
    }
}
