//! Host fingerprint checks
//!
//! SSH host keys are compared by SHA-256, given either as Base64
//! (`SHA256:...`, the OpenSSH form, optionally preceded by key type and size)
//! or as hex.

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD as B64};

use crate::error::TransferError;

/// Lowercase colon separated hex
pub fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn normalize_hex(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Check an SSH host key SHA-256 hash against an expected fingerprint
pub fn verify_host_key(expected: &str, sha256: &[u8]) -> Result<(), TransferError> {
    let token = expected.split_whitespace().last().unwrap_or_default();
    let token = token.strip_prefix("SHA256:").unwrap_or(token);
    let base64_form = B64.encode(sha256);

    let matches = token.trim_end_matches('=') == base64_form
        || normalize_hex(token) == normalize_hex(&colon_hex(sha256));
    if matches {
        Ok(())
    } else {
        Err(TransferError::FingerprintMismatch {
            expected: expected.to_string(),
            actual: format!("SHA256:{}", base64_form),
        })
    }
}
