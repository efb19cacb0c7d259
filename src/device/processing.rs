//! Report processing
//!
//! Runs the upload hook steps for one report. The session opened while
//! processing is closed when the steps end, whether they succeed or not.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::device::remote::RemoteOutputDevice;
use crate::error::DeviceError;
use crate::hooks::{self, UploadStep};
use crate::report::Report;
use crate::storage::{create_zip, file_stem, unique_file_name};
use crate::transfer::{TransferMode, TransferOptions};

/// What a processed report left behind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutcome {
    /// Local file that was uploaded last: the result or its zip
    pub local_path: PathBuf,
    /// Remote paths written, in order
    pub remote_paths: Vec<String>,
    pub bytes_sent: u64,
}

struct UploadState {
    local_path: PathBuf,
    file_name: String,
    remote_path: String,
    transfer_mode: TransferMode,
    overwrite: bool,
    zipped: bool,
    outcome: ProcessOutcome,
}

impl UploadState {
    fn new(report: &Report) -> Self {
        Self {
            local_path: report.result_file_path.clone(),
            file_name: report.result_file_name.clone(),
            remote_path: String::new(),
            transfer_mode: TransferMode::Automatic,
            overwrite: true,
            zipped: false,
            outcome: ProcessOutcome::default(),
        }
    }

    fn render(&self, template: &str, report: &Report, device: &RemoteOutputDevice) -> String {
        let folder = report.output.folder_with_separators();
        let local_path = self.local_path.display().to_string();
        hooks::render(
            template,
            &[
                ("folder", folder.as_str()),
                ("file_name", self.file_name.as_str()),
                ("local_path", local_path.as_str()),
                ("remote_path", self.remote_path.as_str()),
                ("host_name", device.config.host_name.as_str()),
                ("device_name", device.config.name.as_str()),
            ],
        )
    }

    fn zip(&mut self, report: &Report) -> Result<(), DeviceError> {
        if self.zipped {
            return Ok(());
        }
        let source = report.result_file_path.as_path();
        let directory = source.parent().unwrap_or_else(|| Path::new(""));
        let target = unique_file_name(&directory.join(format!("{}.zip", file_stem(source))));
        let password = report.output.zip_password.as_deref();

        create_zip(source, &report.result_file_name, &target, password)?;
        self.file_name = format!("{}.zip", file_stem(Path::new(&report.result_file_name)));
        self.local_path = target;
        self.zipped = true;
        Ok(())
    }
}

impl RemoteOutputDevice {
    /// Deliver the result of `report` by running the upload hook
    pub async fn process(&mut self, report: &mut Report) -> Result<ProcessOutcome, DeviceError> {
        let steps = hooks::parse_upload_hook(self.upload_hook())?;
        let result = self.run_upload_steps(&steps, report).await;
        self.close_session().await;
        result
    }

    async fn run_upload_steps(
        &mut self,
        steps: &[UploadStep],
        report: &mut Report,
    ) -> Result<ProcessOutcome, DeviceError> {
        let mut state = UploadState::new(report);

        for step in steps {
            debug!("Device '{}' running step: {}", self.config.name, step);
            match step {
                UploadStep::ZipIfRequested => {
                    if report.output.zip_result {
                        state.zip(report)?;
                    }
                }
                UploadStep::Zip => state.zip(report)?,
                UploadStep::OpenSession => {
                    self.open_session().await?;
                }
                UploadStep::TransferMode(mode) => state.transfer_mode = *mode,
                UploadStep::Overwrite(overwrite) => state.overwrite = *overwrite,
                UploadStep::Put(template) => {
                    let remote = state.render(template, report, self);
                    if self.session.is_none() {
                        self.open_session().await?;
                    }
                    let session = self.session.as_mut().ok_or(DeviceError::NoOpenSession)?;
                    let options = TransferOptions {
                        transfer_mode: state.transfer_mode,
                        overwrite: state.overwrite,
                    };
                    let bytes = session.put_file(&state.local_path, &remote, &options).await?;

                    state.outcome.bytes_sent += bytes;
                    state.outcome.remote_paths.push(remote.clone());
                    state.remote_path = remote;
                }
                UploadStep::Information(text) => {
                    let text = state.render(&report.translate(text), report, self);
                    report.output.information = text;
                }
                UploadStep::Log(text) => {
                    let text = state.render(&report.translate(text), report, self);
                    report.log_message(&text);
                }
            }
        }

        info!(
            "Device '{}' processed {} ({} file(s), {} bytes)",
            self.config.name,
            report.result_file_name,
            state.outcome.remote_paths.len(),
            state.outcome.bytes_sent
        );
        state.outcome.local_path = state.local_path;
        Ok(state.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportOutput;
    use std::fs;

    #[tokio::test]
    async fn test_zip_and_messages_without_put() {
        let dir = tempfile::tempdir().unwrap();
        let result = dir.path().join("sales.html");
        fs::write(&result, "<html></html>").unwrap();
        fs::write(dir.path().join("sales.zip"), "taken").unwrap();

        let mut report = Report::new(
            &result,
            ReportOutput {
                folder: "out".into(),
                zip_result: true,
                ..Default::default()
            },
        );
        report
            .translations
            .insert("Zipped to {local_path}".into(), "Archive: {local_path}".into());

        let mut device = RemoteOutputDevice::create();
        device.config.upload_hook =
            "zip_if_requested\ninformation Zipped to {local_path}\nlog {folder}{file_name}".into();

        let outcome = device.process(&mut report).await.unwrap();
        let zip_path = dir.path().join("sales (1).zip");
        assert_eq!(outcome.local_path, zip_path);
        assert!(zip_path.exists());
        assert!(outcome.remote_paths.is_empty());
        assert_eq!(
            report.output.information,
            format!("Archive: {}", zip_path.display())
        );
        assert_eq!(report.execution_messages, vec!["/out/sales.zip".to_string()]);
        assert_eq!(report.result_file_path, result);
    }

    #[tokio::test]
    async fn test_invalid_upload_hook() {
        let mut report = Report::new("/tmp/none.pdf", ReportOutput::default());
        let mut device = RemoteOutputDevice::create();
        device.config.upload_hook = "upload everything".into();
        assert!(matches!(
            device.process(&mut report).await,
            Err(DeviceError::Hook(_))
        ));
    }
}
