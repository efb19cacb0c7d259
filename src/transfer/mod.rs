//! Transfer client
//!
//! One session type per protocol behind the [`TransferSession`] trait.
//! A session is opened for one device at a time and closed explicitly.

pub mod fingerprint;
pub mod ftp;
pub mod options;
pub mod ssh;
pub mod webdav;

use async_trait::async_trait;
use log::info;
use std::path::Path;

use crate::device::Protocol;
use crate::error::TransferError;

pub use options::{SessionOptions, TransferMode, TransferOptions};

/// An authenticated connection to a file server
#[async_trait]
pub trait TransferSession: Send {
    fn protocol(&self) -> Protocol;

    /// Human-readable target, without the password
    fn describe(&self) -> String;

    /// Upload `local` to `remote`, returning the number of bytes sent
    async fn put_file(
        &mut self,
        local: &Path,
        remote: &str,
        options: &TransferOptions,
    ) -> Result<u64, TransferError>;

    /// Log out and release the connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), TransferError>;
}

/// Open a session for `options.protocol`
pub async fn open_session(
    options: &SessionOptions,
) -> Result<Box<dyn TransferSession>, TransferError> {
    info!("Opening {} session to {}", options.protocol, options.address());
    let session: Box<dyn TransferSession> = match options.protocol {
        Protocol::Ftp => Box::new(ftp::FtpSession::connect(options).await?),
        Protocol::Sftp | Protocol::Scp => Box::new(ssh::SshSession::connect(options)?),
        Protocol::Webdav => Box::new(webdav::WebdavSession::connect(options).await?),
    };
    Ok(session)
}
