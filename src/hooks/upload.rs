//! Upload hook
//!
//! One step per line, the step name followed by its argument. The device
//! runs the steps in order when processing a report.

use std::fmt;

use crate::error::HookError;
use crate::transfer::TransferMode;

/// Body used when the device has no upload hook of its own
pub const DEFAULT_UPLOAD_HOOK: &str = "\
# Zip the result when the report output asks for it, then upload it
zip_if_requested
open_session
put {folder}{file_name}
information Report result generated in '{remote_path}'
log Report result generated in '{remote_path}'
";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStep {
    /// Zip the result only when the report output requests it
    ZipIfRequested,
    Zip,
    OpenSession,
    TransferMode(TransferMode),
    /// Whether later puts may replace an existing remote file
    Overwrite(bool),
    /// Upload the current local file to the rendered remote path
    Put(String),
    Information(String),
    Log(String),
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStep::ZipIfRequested => write!(f, "zip_if_requested"),
            UploadStep::Zip => write!(f, "zip"),
            UploadStep::OpenSession => write!(f, "open_session"),
            UploadStep::TransferMode(mode) => write!(f, "transfer_mode {:?}", mode),
            UploadStep::Overwrite(true) => write!(f, "overwrite on"),
            UploadStep::Overwrite(false) => write!(f, "overwrite off"),
            UploadStep::Put(target) => write!(f, "put {}", target),
            UploadStep::Information(text) => write!(f, "information {}", text),
            UploadStep::Log(text) => write!(f, "log {}", text),
        }
    }
}

fn required(line: usize, step: &str, arg: &str) -> Result<String, HookError> {
    if arg.is_empty() {
        Err(HookError::MissingArgument {
            line,
            step: step.to_string(),
        })
    } else {
        Ok(arg.to_string())
    }
}

// Parse a single step line
fn parse_step(line: usize, raw: &str) -> Result<UploadStep, HookError> {
    let mut parts = raw.splitn(2, char::is_whitespace);
    let step = parts.next().unwrap_or("").to_ascii_lowercase();
    let arg = parts.next().unwrap_or("").trim();

    match step.as_str() {
        "zip_if_requested" => Ok(UploadStep::ZipIfRequested),
        "zip" => Ok(UploadStep::Zip),
        "open_session" => Ok(UploadStep::OpenSession),
        "transfer_mode" => {
            let mode = required(line, &step, arg)?;
            mode.parse()
                .map(UploadStep::TransferMode)
                .map_err(|_| HookError::InvalidValue {
                    line,
                    key: step.clone(),
                    value: mode,
                })
        }
        "overwrite" => {
            let flag = required(line, &step, arg)?;
            match flag.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => Ok(UploadStep::Overwrite(true)),
                "off" | "false" | "no" => Ok(UploadStep::Overwrite(false)),
                _ => Err(HookError::InvalidValue {
                    line,
                    key: step.clone(),
                    value: flag,
                }),
            }
        }
        "put" => required(line, &step, arg).map(UploadStep::Put),
        "information" => required(line, &step, arg).map(UploadStep::Information),
        "log" => required(line, &step, arg).map(UploadStep::Log),
        _ => Err(HookError::UnknownStep { line, step }),
    }
}

/// Parse an upload hook body, skipping blank lines and `#` comments
pub fn parse_upload_hook(body: &str) -> Result<Vec<UploadStep>, HookError> {
    body.lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| parse_step(line, raw))
        .collect()
}
