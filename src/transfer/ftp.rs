//! FTP and FTPS sessions
//!
//! The blocking suppaftp client lives on a worker thread for the lifetime of
//! the session. The async side sends it one request at a time and waits for
//! the reply, so the runtime never blocks on the control connection.

use async_trait::async_trait;
use log::{debug, info, warn};
use native_tls::TlsConnector;
use std::fs;
use std::io::Cursor;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::thread;
use suppaftp::types::{FileType, FormatControl};
use suppaftp::{NativeTlsConnector, NativeTlsFtpStream};
use tokio::sync::{mpsc, oneshot};

use crate::device::{FtpSecure, Protocol};
use crate::error::TransferError;
use crate::transfer::TransferSession;
use crate::transfer::options::{SessionOptions, TransferMode, TransferOptions};

enum Request {
    Put {
        local: PathBuf,
        remote: String,
        options: TransferOptions,
        reply: oneshot::Sender<Result<u64, TransferError>>,
    },
    Close {
        reply: oneshot::Sender<Result<(), TransferError>>,
    },
}

pub struct FtpSession {
    requests: Option<mpsc::UnboundedSender<Request>>,
    options: SessionOptions,
}

fn worker_gone() -> TransferError {
    TransferError::Protocol("FTP worker stopped".into())
}

impl FtpSession {
    /// Connect and log in
    pub async fn connect(options: &SessionOptions) -> Result<Self, TransferError> {
        let (requests, receiver) = mpsc::unbounded_channel();
        let (ready, connected) = oneshot::channel();
        let worker_options = options.clone();

        thread::Builder::new()
            .name(format!("ftp-{}", options.address()))
            .spawn(move || match open_stream(&worker_options) {
                Ok(stream) => {
                    if ready.send(Ok(())).is_ok() {
                        serve(stream, receiver, &worker_options);
                    }
                }
                Err(e) => {
                    let _ = ready.send(Err(e));
                }
            })?;

        connected.await.map_err(|_| worker_gone())??;
        info!(
            "FTP session open on {} as '{}' ({})",
            options.address(),
            options.user_name,
            options.ftp_secure
        );

        Ok(Self {
            requests: Some(requests),
            options: options.clone(),
        })
    }

    fn send(&self, request: Request) -> Result<(), TransferError> {
        self.requests
            .as_ref()
            .ok_or_else(|| TransferError::Protocol("session is closed".into()))?
            .send(request)
            .map_err(|_| worker_gone())
    }
}

fn tls_connector(options: &SessionOptions) -> Result<NativeTlsConnector, TransferError> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(options.accept_any_tls_certificate)
        .danger_accept_invalid_hostnames(options.accept_any_tls_certificate)
        .build()?;
    Ok(NativeTlsConnector::from(connector))
}

fn open_stream(options: &SessionOptions) -> Result<NativeTlsFtpStream, TransferError> {
    let address = options.address();
    let connect_failed = |reason: String| TransferError::ConnectFailed(format!("{}: {}", address, reason));
    let socket = address
        .to_socket_addrs()
        .map_err(|e| connect_failed(e.to_string()))?
        .next()
        .ok_or_else(|| connect_failed("no address".into()))?;

    let mut stream = match options.ftp_secure {
        FtpSecure::Implicit => NativeTlsFtpStream::connect_secure_implicit(
            socket,
            tls_connector(options)?,
            &options.host_name,
        )
        .map_err(|e| connect_failed(e.to_string()))?,
        _ => NativeTlsFtpStream::connect_timeout(socket, options.timeout)
            .map_err(|e| connect_failed(e.to_string()))?,
    };
    stream.get_ref().set_read_timeout(Some(options.timeout))?;
    stream.get_ref().set_write_timeout(Some(options.timeout))?;

    if options.ftp_secure == FtpSecure::Explicit {
        stream = stream
            .into_secure(tls_connector(options)?, &options.host_name)
            .map_err(|e| TransferError::Tls(e.to_string()))?;
    }

    let user = if options.user_name.is_empty() {
        "anonymous"
    } else {
        options.user_name.as_str()
    };
    stream
        .login(user, &options.password)
        .map_err(|e| TransferError::AuthFailed(e.to_string()))?;
    Ok(stream)
}

// Worker loop: runs until close or until the session is dropped
fn serve(
    mut stream: NativeTlsFtpStream,
    mut requests: mpsc::UnboundedReceiver<Request>,
    options: &SessionOptions,
) {
    while let Some(request) = requests.blocking_recv() {
        match request {
            Request::Put {
                local,
                remote,
                options: transfer,
                reply,
            } => {
                let _ = reply.send(put(&mut stream, &local, &remote, &transfer));
            }
            Request::Close { reply } => {
                let _ = reply.send(stream.quit().map_err(TransferError::from));
                return;
            }
        }
    }

    debug!("FTP session to {} abandoned, sending QUIT", options.address());
    if let Err(e) = stream.quit() {
        debug!("QUIT failed on {}: {}", options.address(), e);
    }
}

fn put(
    stream: &mut NativeTlsFtpStream,
    local: &Path,
    remote: &str,
    options: &TransferOptions,
) -> Result<u64, TransferError> {
    let content = fs::read(local).map_err(|e| TransferError::LocalFile(local.to_path_buf(), e))?;

    if !options.overwrite && stream.size(remote).is_ok() {
        return Err(TransferError::RemoteWrite(format!(
            "'{}' already exists",
            remote
        )));
    }

    let payload = match options.transfer_mode.resolve(local) {
        TransferMode::Ascii => {
            stream.transfer_type(FileType::Ascii(FormatControl::Default))?;
            to_network_ascii(&content)
        }
        _ => {
            stream.transfer_type(FileType::Binary)?;
            content
        }
    };

    let sent = stream
        .put_file(remote, &mut Cursor::new(payload))
        .map_err(|e| TransferError::RemoteWrite(format!("STOR {} failed: {}", remote, e)))?;
    info!("Uploaded {} to {} ({} bytes)", local.display(), remote, sent);
    Ok(sent)
}

/// LF line endings become CRLF for ASCII transfers
fn to_network_ascii(content: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(content.len() + content.len() / 32);
    let mut previous = 0u8;
    for &byte in content {
        if byte == b'\n' && previous != b'\r' {
            output.push(b'\r');
        }
        output.push(byte);
        previous = byte;
    }
    output
}

#[async_trait]
impl TransferSession for FtpSession {
    fn protocol(&self) -> Protocol {
        Protocol::Ftp
    }

    fn describe(&self) -> String {
        let scheme = if self.options.ftp_secure == FtpSecure::None {
            "ftp"
        } else {
            "ftps"
        };
        format!(
            "{}://{}@{}",
            scheme,
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
        let (reply, response) = oneshot::channel();
        self.send(Request::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            options: *options,
            reply,
        })?;
        response.await.map_err(|_| worker_gone())?
    }

    async fn close(&mut self) -> Result<(), TransferError> {
        if self.requests.is_none() {
            return Ok(());
        }
        let (reply, response) = oneshot::channel();
        let sent = self.send(Request::Close { reply });
        self.requests = None;
        sent?;
        if let Err(e) = response.await.map_err(|_| worker_gone())? {
            warn!("QUIT failed on {}: {}", self.options.address(), e);
        }
        Ok(())
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if self.requests.is_some() {
            warn!(
                "FTP session to {} dropped without close",
                self.options.address()
            );
        }
    }
}
