//! Device enumerations
//!
//! Protocol and secure-transport selections persisted with a device.
//! Both are written to the device file as their lowercase names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol used to reach the file server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Protocol {
    #[default]
    Ftp,
    Sftp,
    Scp,
    Webdav,
}

impl Protocol {
    /// Usual port for the protocol
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp | Protocol::Scp => 22,
            Protocol::Webdav => 80,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
            Protocol::Scp => "scp",
            Protocol::Webdav => "webdav",
        };
        f.write_str(name)
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ftp" => Ok(Protocol::Ftp),
            "sftp" => Ok(Protocol::Sftp),
            "scp" => Ok(Protocol::Scp),
            "webdav" => Ok(Protocol::Webdav),
            other => Err(format!("unknown protocol '{}'", other)),
        }
    }
}

impl From<Protocol> for String {
    fn from(value: Protocol) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// TLS mode for FTP connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FtpSecure {
    #[default]
    None,
    /// TLS from the first byte (usually port 990)
    Implicit,
    /// Plain connection upgraded with `AUTH TLS`
    Explicit,
}

impl fmt::Display for FtpSecure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FtpSecure::None => "none",
            FtpSecure::Implicit => "implicit",
            FtpSecure::Explicit => "explicit",
        };
        f.write_str(name)
    }
}

impl FromStr for FtpSecure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(FtpSecure::None),
            "implicit" => Ok(FtpSecure::Implicit),
            "explicit" => Ok(FtpSecure::Explicit),
            other => Err(format!("unknown FTP secure mode '{}'", other)),
        }
    }
}

impl From<FtpSecure> for String {
    fn from(value: FtpSecure) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for FtpSecure {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
