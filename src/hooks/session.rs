//! Session hook
//!
//! Turns the device's session hook body into [`SessionOptions`]. Each line is
//! `key = value`; values may use the device placeholders `{protocol}`,
//! `{host_name}`, `{port_number}`, `{user_name}`, `{clear_password}` and
//! `{ftp_secure}`.

use log::debug;
use std::time::Duration;

use crate::device::{FtpSecure, Protocol};
use crate::error::HookError;
use crate::hooks::template;
use crate::transfer::SessionOptions;

/// Body used when the device has no session hook of its own
pub const DEFAULT_SESSION_HOOK: &str = "\
# Session options, one 'key = value' per line
protocol = {protocol}
host_name = {host_name}
port_number = {port_number}
user_name = {user_name}
password = {clear_password}
ftp_secure = {ftp_secure}
# accept_any_tls_certificate = false
# webdav_secure = false
# ssh_host_key_fingerprint =
# timeout_secs = 30
";

fn parse_value<T: std::str::FromStr>(line: usize, key: &str, value: &str) -> Result<T, HookError> {
    value.trim().parse::<T>().map_err(|_| HookError::InvalidValue {
        line,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Apply `body` on top of `device`, the options built from the device fields
pub fn parse_session_hook(body: &str, device: &SessionOptions) -> Result<SessionOptions, HookError> {
    let port_number = device.port_number.to_string();
    let values = [
        ("protocol", device.protocol.to_string()),
        ("host_name", device.host_name.clone()),
        ("port_number", port_number),
        ("user_name", device.user_name.clone()),
        ("clear_password", device.password.clone()),
        ("ftp_secure", device.ftp_secure.to_string()),
    ];
    let values: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let mut options = device.clone();
    for (index, raw) in body.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| HookError::MalformedLine {
                line,
                text: trimmed.to_string(),
            })?;
        let key = key.trim().to_ascii_lowercase();
        let value = template::render(value.trim(), &values);

        match key.as_str() {
            "protocol" => options.protocol = parse_value::<Protocol>(line, &key, &value)?,
            "host_name" => options.host_name = value.trim().to_string(),
            "port_number" => options.port_number = parse_value(line, &key, &value)?,
            "user_name" => options.user_name = value,
            "password" => options.password = value,
            "ftp_secure" => options.ftp_secure = parse_value::<FtpSecure>(line, &key, &value)?,
            "accept_any_tls_certificate" => {
                options.accept_any_tls_certificate = parse_value(line, &key, &value)?
            }
            "webdav_secure" => options.webdav_secure = parse_value(line, &key, &value)?,
            "ssh_host_key_fingerprint" => options.ssh_host_key_fingerprint = optional(value),
            "timeout_secs" => {
                let secs: u64 = parse_value(line, &key, &value)?;
                if secs == 0 {
                    return Err(HookError::InvalidValue { line, key, value });
                }
                options.timeout = Duration::from_secs(secs);
            }
            _ => return Err(HookError::UnknownOption { line, key }),
        }
    }

    debug!("Session hook produced {:?}", options);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_options() -> SessionOptions {
        SessionOptions {
            protocol: Protocol::Sftp,
            host_name: "files.example.com".into(),
            port_number: 2222,
            user_name: "report".into(),
            password: "p = a#ss".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_hook_keeps_device_values() {
        let device = device_options();
        let options = parse_session_hook(DEFAULT_SESSION_HOOK, &device).unwrap();
        assert_eq!(options, device);
    }

    #[test]
    fn test_overrides_and_comments() {
        let body = "\
# comment
timeout_secs = 5

ftp_secure = explicit
accept_any_tls_certificate = true
ssh_host_key_fingerprint = AB:CD
webdav_secure = true
host_name = backup-{host_name}
";
        let options = parse_session_hook(body, &device_options()).unwrap();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.ftp_secure, FtpSecure::Explicit);
        assert!(options.accept_any_tls_certificate);
        assert!(options.webdav_secure);
        assert_eq!(options.ssh_host_key_fingerprint.as_deref(), Some("AB:CD"));
        assert_eq!(options.host_name, "backup-files.example.com");
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let device = device_options();
        assert_eq!(
            parse_session_hook("\nproxy = on", &device),
            Err(HookError::UnknownOption {
                line: 2,
                key: "proxy".into()
            })
        );
        assert_eq!(
            parse_session_hook("port_number = abc", &device),
            Err(HookError::InvalidValue {
                line: 1,
                key: "port_number".into(),
                value: "abc".into()
            })
        );
        assert_eq!(
            parse_session_hook("# ok\n\njust text", &device),
            Err(HookError::MalformedLine {
                line: 3,
                text: "just text".into()
            })
        );
        assert!(parse_session_hook("timeout_secs = 0", &device).is_err());
        assert_eq!(
            parse_session_hook("tls_host_certificate_fingerprint = AB:CD", &device),
            Err(HookError::UnknownOption {
                line: 1,
                key: "tls_host_certificate_fingerprint".into()
            })
        );
    }
}
