//! Remote output device
//!
//! Configuration record, persistence and report delivery for a file-server
//! output device.

pub mod config;
pub mod persistence;
pub mod processing;
pub mod remote;
pub mod types;

pub use self::config::DeviceConfig;
pub use processing::ProcessOutcome;
pub use remote::{DEFAULT_GUID, RemoteOutputDevice};
pub use types::{FtpSecure, Protocol};
