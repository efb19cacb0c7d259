pub mod config;
pub mod crypto;
pub mod device;
pub mod error;
pub mod hooks;
pub mod report;
pub mod storage;
pub mod transfer;

pub use self::config::DeviceSettings;
pub use device::{DeviceConfig, FtpSecure, ProcessOutcome, Protocol, RemoteOutputDevice};
pub use error::DeviceError;
pub use report::{Report, ReportOutput};
