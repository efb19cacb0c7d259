//! Error handlers
//!
//! Provides error reporting helpers.

use crate::error::types::DeviceError;
use log::error;
use std::error::Error;

/// Handle a device error
pub fn handle_error(err: &DeviceError) {
    error!("Output device error: {}", err);
}

/// Flatten an error and its sources into a single line.
///
/// Sources whose message is already contained in the outer message are skipped.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        let text = text.trim();
        if !text.is_empty() && !message.contains(text) {
            message.push(' ');
            message.push_str(text);
        }
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::TransferError;
    use std::io;

    #[test]
    fn test_error_chain_skips_repeated_source() {
        let err = DeviceError::Transfer(TransferError::AuthFailed("bad login".into()));
        assert_eq!(
            error_chain(&err),
            "Transfer error: Authentication failed: bad login"
        );
    }

    #[test]
    fn test_error_chain_includes_io_source() {
        let err = DeviceError::Transfer(TransferError::LocalFile(
            "/tmp/missing.pdf".into(),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        ));
        let text = error_chain(&err);
        assert!(text.starts_with("Transfer error: Cannot read local file"));
        assert!(text.contains("gone"));
    }
}
