//! Report context handed to the device
//!
//! The execution engine renders the report and then passes this context to
//! [`RemoteOutputDevice::process`](crate::device::RemoteOutputDevice::process).

use log::info;
use std::collections::HashMap;
use std::path::PathBuf;

/// Output settings of the report being processed
#[derive(Debug, Clone, Default)]
pub struct ReportOutput {
    /// Remote folder receiving the result
    pub folder: String,
    pub zip_result: bool,
    pub zip_password: Option<String>,
    /// Last information message set by the device
    pub information: String,
}

impl ReportOutput {
    /// Folder with a leading and trailing `/`
    pub fn folder_with_separators(&self) -> String {
        let trimmed = self.folder.trim().trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

/// A rendered report waiting to be delivered
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub result_file_path: PathBuf,
    pub result_file_name: String,
    pub output: ReportOutput,
    pub translations: HashMap<String, String>,
    pub execution_messages: Vec<String>,
}

impl Report {
    pub fn new(result_file_path: impl Into<PathBuf>, output: ReportOutput) -> Self {
        let result_file_path = result_file_path.into();
        let result_file_name = result_file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            result_file_path,
            result_file_name,
            output,
            ..Default::default()
        }
    }

    /// Translated text, or the text itself when no translation exists
    pub fn translate(&self, text: &str) -> String {
        self.translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }

    /// Append a message to the execution log
    pub fn log_message(&mut self, message: &str) {
        info!("{}", message);
        self.execution_messages.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_with_separators() {
        let mut output = ReportOutput::default();
        assert_eq!(output.folder_with_separators(), "/");
        output.folder = "reports/daily".into();
        assert_eq!(output.folder_with_separators(), "/reports/daily/");
        output.folder = "/out/".into();
        assert_eq!(output.folder_with_separators(), "/out/");
    }

    #[test]
    fn test_new_takes_file_name() {
        let report = Report::new("/tmp/run/sales.pdf", ReportOutput::default());
        assert_eq!(report.result_file_name, "sales.pdf");
    }

    #[test]
    fn test_translate_falls_back_to_text() {
        let mut report = Report::default();
        report
            .translations
            .insert("Hello".into(), "Bonjour".into());
        assert_eq!(report.translate("Hello"), "Bonjour");
        assert_eq!(report.translate("Bye"), "Bye");
    }
}
