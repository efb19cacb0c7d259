//! SFTP and SCP sessions over ssh2
//!
//! ssh2 is blocking; calls run on the caller's task for the duration of the
//! network operation.

use async_trait::async_trait;
use log::{debug, info, warn};
use ssh2::{HashType, OpenFlags, OpenType, Session};
use std::fs::File;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;

use crate::device::Protocol;
use crate::error::TransferError;
use crate::transfer::TransferSession;
use crate::transfer::fingerprint;
use crate::transfer::options::{SessionOptions, TransferOptions};

const REMOTE_FILE_MODE: i32 = 0o644;

pub struct SshSession {
    protocol: Protocol,
    session: Option<Session>,
    options: SessionOptions,
}

impl SshSession {
    /// Connect, check the host key and authenticate with the password
    pub fn connect(options: &SessionOptions) -> Result<Self, TransferError> {
        let address = options.address();
        let socket_addr = address
            .to_socket_addrs()
            .map_err(|e| TransferError::ConnectFailed(format!("{}: {}", address, e)))?
            .next()
            .ok_or_else(|| TransferError::ConnectFailed(format!("{}: no address", address)))?;

        let tcp = TcpStream::connect_timeout(&socket_addr, options.timeout)
            .map_err(|e| TransferError::ConnectFailed(format!("{}: {}", address, e)))?;
        tcp.set_read_timeout(Some(options.timeout))?;
        tcp.set_write_timeout(Some(options.timeout))?;

        let mut session = Session::new()?;
        session.set_timeout(options.timeout.as_millis().min(u32::MAX as u128) as u32);
        session.set_tcp_stream(tcp);
        session.handshake()?;

        if let Some(expected) = &options.ssh_host_key_fingerprint {
            let hash = session
                .host_key_hash(HashType::Sha256)
                .ok_or_else(|| TransferError::Protocol("host key hash unavailable".into()))?;
            fingerprint::verify_host_key(expected, hash)?;
            debug!("Host key of {} verified", address);
        } else {
            warn!("No SSH host key fingerprint configured for {}", address);
        }

        session
            .userauth_password(&options.user_name, &options.password)
            .map_err(|e| TransferError::AuthFailed(e.to_string()))?;
        if !session.authenticated() {
            return Err(TransferError::AuthFailed(format!(
                "server rejected user '{}'",
                options.user_name
            )));
        }

        info!(
            "{} session open on {} as '{}'",
            options.protocol, address, options.user_name
        );
        Ok(Self {
            protocol: options.protocol,
            session: Some(session),
            options: options.clone(),
        })
    }

    fn session(&self) -> Result<&Session, TransferError> {
        self.session
            .as_ref()
            .ok_or_else(|| TransferError::Protocol("session is closed".into()))
    }

    fn sftp_put(
        &self,
        local: &mut File,
        remote: &str,
        options: &TransferOptions,
    ) -> Result<u64, TransferError> {
        let sftp = self.session()?.sftp()?;
        let remote_path = Path::new(remote);
        if !options.overwrite && sftp.stat(remote_path).is_ok() {
            return Err(TransferError::RemoteWrite(format!(
                "'{}' already exists",
                remote
            )));
        }

        let mut target = sftp
            .open_mode(
                remote_path,
                OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
                REMOTE_FILE_MODE,
                OpenType::File,
            )
            .map_err(|e| TransferError::RemoteWrite(format!("{}: {}", remote, e)))?;
        let bytes = io::copy(local, &mut target)?;
        target.flush()?;
        Ok(bytes)
    }

    fn scp_put(
        &self,
        local: &mut File,
        size: u64,
        remote: &str,
        options: &TransferOptions,
    ) -> Result<u64, TransferError> {
        let session = self.session()?;
        if !options.overwrite {
            let test = format!("test -e '{}'", remote.replace('\'', "'\\''"));
            let mut channel = session.channel_session()?;
            channel.exec(&test)?;
            channel.wait_close()?;
            if channel.exit_status()? == 0 {
                return Err(TransferError::RemoteWrite(format!(
                    "'{}' already exists",
                    remote
                )));
            }
        }

        let mut channel = session
            .scp_send(Path::new(remote), REMOTE_FILE_MODE, size, None)
            .map_err(|e| TransferError::RemoteWrite(format!("{}: {}", remote, e)))?;
        let bytes = io::copy(local, &mut channel)?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;
        Ok(bytes)
    }
}

#[async_trait]
impl TransferSession for SshSession {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn describe(&self) -> String {
        format!(
            "{}://{}@{}",
            self.protocol,
            self.options.user_name,
            self.options.address()
        )
    }

    async fn put_file(
        &mut self,
        local: &Path,
        remote: &str,
        options: &TransferOptions,
    ) -> Result<u64, TransferError> {
        let mut file =
            File::open(local).map_err(|e| TransferError::LocalFile(local.to_path_buf(), e))?;
        let size = file
            .metadata()
            .map_err(|e| TransferError::LocalFile(local.to_path_buf(), e))?
            .len();

        let bytes = match self.protocol {
            Protocol::Scp => self.scp_put(&mut file, size, remote, options)?,
            _ => self.sftp_put(&mut file, remote, options)?,
        };

        info!("Uploaded {} to {} ({} bytes)", local.display(), remote, bytes);
        Ok(bytes)
    }

    async fn close(&mut self) -> Result<(), TransferError> {
        if let Some(session) = self.session.take() {
            session.disconnect(None, "closing", None)?;
        }
        Ok(())
    }
}
