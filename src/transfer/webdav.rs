//! WebDAV sessions
//!
//! Opening the session sends `PROPFIND` to the root so bad credentials
//! fail at open time, like the other protocols. Files are sent with `PUT`.

use async_trait::async_trait;
use log::info;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use std::path::Path;

use crate::device::Protocol;
use crate::error::TransferError;
use crate::transfer::TransferSession;
use crate::transfer::options::{SessionOptions, TransferOptions};

pub struct WebdavSession {
    client: Client,
    base_url: Url,
    options: SessionOptions,
}

fn check_status(status: StatusCode, target: &str) -> Result<(), TransferError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransferError::AuthFailed(
            format!("{} returned {}", target, status),
        )),
        StatusCode::PRECONDITION_FAILED => Err(TransferError::RemoteWrite(format!(
            "'{}' already exists",
            target
        ))),
        _ => Err(TransferError::Http(format!("{} returned {}", target, status))),
    }
}

impl WebdavSession {
    pub async fn connect(options: &SessionOptions) -> Result<Self, TransferError> {
        let scheme = if options.webdav_secure { "https" } else { "http" };
        let base_url = Url::parse(&format!("{}://{}/", scheme, options.address()))
            .map_err(|e| TransferError::ConnectFailed(format!("{}: {}", options.address(), e)))?;

        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_any_tls_certificate)
            .danger_accept_invalid_hostnames(options.accept_any_tls_certificate)
            .build()?;

        let propfind = Method::from_bytes(b"PROPFIND")
            .map_err(|e| TransferError::Protocol(e.to_string()))?;
        let response = client
            .request(propfind, base_url.clone())
            .basic_auth(&options.user_name, Some(&options.password))
            .header("Depth", "0")
            .send()
            .await
            .map_err(|e| TransferError::ConnectFailed(format!("{}: {}", base_url, e)))?;
        check_status(response.status(), base_url.as_str())?;

        info!("WebDAV session open on {} as '{}'", base_url, options.user_name);
        Ok(Self {
            client,
            base_url,
            options: options.clone(),
        })
    }

    fn url_for(&self, remote: &str) -> Result<Url, TransferError> {
        self.base_url
            .join(remote.trim_start_matches('/'))
            .map_err(|e| TransferError::Protocol(format!("bad remote path '{}': {}", remote, e)))
    }
}

#[async_trait]
impl TransferSession for WebdavSession {
    fn protocol(&self) -> Protocol {
        Protocol::Webdav
    }

    fn describe(&self) -> String {
        format!("{} as '{}'", self.base_url, self.options.user_name)
    }

    async fn put_file(
        &mut self,
        local: &Path,
        remote: &str,
        options: &TransferOptions,
    ) -> Result<u64, TransferError> {
        let content = tokio::fs::read(local)
            .await
            .map_err(|e| TransferError::LocalFile(local.to_path_buf(), e))?;
        let size = content.len() as u64;
        let url = self.url_for(remote)?;

        let mut request = self
            .client
            .put(url.clone())
            .basic_auth(&self.options.user_name, Some(&self.options.password))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .body(content);
        if !options.overwrite {
            request = request.header("If-None-Match", "*");
        }

        let response = request.send().await?;
        check_status(response.status(), url.as_str())?;

        info!("Uploaded {} to {} ({} bytes)", local.display(), url, size);
        Ok(size)
    }

    async fn close(&mut self) -> Result<(), TransferError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::CREATED, "x").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "x").is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "x"),
            Err(TransferError::AuthFailed(_))
        ));
        assert!(matches!(
            check_status(StatusCode::PRECONDITION_FAILED, "x"),
            Err(TransferError::RemoteWrite(_))
        ));
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR, "x"),
            Err(TransferError::Http(_))
        ));
    }
}
