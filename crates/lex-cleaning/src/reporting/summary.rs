//! JSON summary of a run, for stdout and report files.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CleaningError, Result};
use crate::types::CleaningReport;

/// Report of one run together with where it read from and wrote to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_file: PathBuf,
    /// Export destination, if the cleaned dataset was written.
    pub output_file: Option<PathBuf>,
    pub report: CleaningReport,
    /// The five-line text form of `report`.
    pub report_text: String,
    /// Steps completed by the run, in order.
    pub steps: Vec<String>,
}

impl RunSummary {
    pub fn new(
        input_file: impl Into<PathBuf>,
        output_file: Option<PathBuf>,
        report: CleaningReport,
        steps: Vec<String>,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            output_file,
            report_text: report.to_text(),
            report,
            steps,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CleaningError::Internal(format!("Failed to serialize report: {}", e)))
    }

    /// Write the summary as pretty JSON, creating parent directories as needed.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CleaningError::io(parent, e))?;
        }

        let json = self.to_json()?;
        let mut file = File::create(path).map_err(|e| CleaningError::io(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| CleaningError::io(path, e))?;

        info!("Report saved: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CleaningReport {
        CleaningReport {
            rows_before: 5,
            rows_after: 4,
            columns_processed: 3,
            missing_filled: 1,
            elapsed_seconds: 0.25,
        }
    }

    #[test]
    fn test_json_contains_report_and_text() {
        let summary = RunSummary::new("in.csv", None, sample_report(), vec!["step".into()]);
        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(value["report"]["rows_before"], 5);
        assert_eq!(value["report"]["missing_filled"], 1);
        assert_eq!(value["output_file"], serde_json::Value::Null);
        assert!(value["report_text"].as_str().unwrap().starts_with("Rows before cleaning: 5\n"));
    }

    #[test]
    fn test_write_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let summary = RunSummary::new(
            "in.csv",
            Some(PathBuf::from("out.csv")),
            sample_report(),
            Vec::new(),
        );

        summary.write_to_file(&path).unwrap();

        let reread: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread, summary);
    }
}
