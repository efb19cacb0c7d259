//! Error types
//!
//! Defines domain-specific error types for each module of the output device.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Password cipher errors
#[derive(Debug)]
pub enum CryptoError {
    InvalidKey(String),
    Encryption(String),
    Decryption(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidKey(msg) => write!(f, "Invalid password key: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Session and upload hook errors
#[derive(Debug, PartialEq)]
pub enum HookError {
    MalformedLine { line: usize, text: String },
    UnknownOption { line: usize, key: String },
    InvalidValue { line: usize, key: String, value: String },
    UnknownStep { line: usize, step: String },
    MissingArgument { line: usize, step: String },
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::MalformedLine { line, text } => {
                write!(f, "Line {}: expected 'key = value', got '{}'", line, text)
            }
            HookError::UnknownOption { line, key } => {
                write!(f, "Line {}: unknown session option '{}'", line, key)
            }
            HookError::InvalidValue { line, key, value } => {
                write!(f, "Line {}: invalid value '{}' for '{}'", line, value, key)
            }
            HookError::UnknownStep { line, step } => {
                write!(f, "Line {}: unknown upload step '{}'", line, step)
            }
            HookError::MissingArgument { line, step } => {
                write!(f, "Line {}: step '{}' requires an argument", line, step)
            }
        }
    }
}

impl std::error::Error for HookError {}

/// Transfer client errors
#[derive(Debug)]
pub enum TransferError {
    ConnectFailed(String),
    Timeout(String),
    Tls(String),
    AuthFailed(String),
    FingerprintMismatch { expected: String, actual: String },
    Protocol(String),
    LocalFile(PathBuf, io::Error),
    RemoteWrite(String),
    Http(String),
    IoError(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::ConnectFailed(msg) => write!(f, "Connection failed: {}", msg),
            TransferError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            TransferError::Tls(msg) => write!(f, "TLS error: {}", msg),
            TransferError::AuthFailed(msg) => write!(f, "Authentication failed: {}", msg),
            TransferError::FingerprintMismatch { expected, actual } => write!(
                f,
                "Host fingerprint mismatch: expected {}, got {}",
                expected, actual
            ),
            TransferError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            TransferError::LocalFile(path, e) => {
                write!(f, "Cannot read local file '{}': {}", path.display(), e)
            }
            TransferError::RemoteWrite(msg) => write!(f, "Remote write failed: {}", msg),
            TransferError::Http(msg) => write!(f, "HTTP error: {}", msg),
            TransferError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::LocalFile(_, e) | TransferError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::IoError(error)
    }
}

impl From<native_tls::Error> for TransferError {
    fn from(error: native_tls::Error) -> Self {
        TransferError::Tls(error.to_string())
    }
}

impl From<suppaftp::FtpError> for TransferError {
    fn from(error: suppaftp::FtpError) -> Self {
        match error {
            suppaftp::FtpError::ConnectionError(e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
            {
                TransferError::Timeout(e.to_string())
            }
            suppaftp::FtpError::ConnectionError(e) => TransferError::IoError(e),
            suppaftp::FtpError::SecureError(msg) => TransferError::Tls(msg),
            other => TransferError::Protocol(format!("FTP: {}", other)),
        }
    }
}

impl From<ssh2::Error> for TransferError {
    fn from(error: ssh2::Error) -> Self {
        TransferError::Protocol(format!("SSH: {}", error))
    }
}

impl From<reqwest::Error> for TransferError {
    fn from(error: reqwest::Error) -> Self {
        TransferError::Http(error.to_string())
    }
}

/// General device error that encompasses all error types
#[derive(Debug)]
pub enum DeviceError {
    EmptyHost,
    Conflict(PathBuf),
    ReadFailed { path: PathBuf, reason: String },
    WriteFailed { path: PathBuf, reason: String },
    Serialization(String),
    NoFilePath,
    NoOpenSession,
    ConnectionTest(String),
    Zip(String),
    Hook(HookError),
    Transfer(TransferError),
    IoError(io::Error),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::EmptyHost => write!(f, "The File Server cannot be empty."),
            DeviceError::Conflict(_) => write!(
                f,
                "Unable to save the Output Device file. The file has been modified by another user."
            ),
            DeviceError::ReadFailed { path, reason } => {
                write!(f, "Unable to read the file '{}'.\n{}", path.display(), reason)
            }
            DeviceError::WriteFailed { path, reason } => {
                write!(f, "Unable to write the file '{}': {}", path.display(), reason)
            }
            DeviceError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            DeviceError::NoFilePath => write!(f, "The device has no backing file"),
            DeviceError::NoOpenSession => write!(f, "No session is open"),
            DeviceError::ConnectionTest(msg) => write!(f, "Connection test failed: {}", msg),
            DeviceError::Zip(msg) => write!(f, "Zip error: {}", msg),
            DeviceError::Hook(e) => write!(f, "Hook error: {}", e),
            DeviceError::Transfer(e) => write!(f, "Transfer error: {}", e),
            DeviceError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Hook(e) => Some(e),
            DeviceError::Transfer(e) => Some(e),
            DeviceError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HookError> for DeviceError {
    fn from(error: HookError) -> Self {
        DeviceError::Hook(error)
    }
}

impl From<TransferError> for DeviceError {
    fn from(error: TransferError) -> Self {
        DeviceError::Transfer(error)
    }
}

impl From<io::Error> for DeviceError {
    fn from(error: io::Error) -> Self {
        DeviceError::IoError(error)
    }
}

impl From<zip::result::ZipError> for DeviceError {
    fn from(error: zip::result::ZipError) -> Self {
        DeviceError::Zip(error.to_string())
    }
}
