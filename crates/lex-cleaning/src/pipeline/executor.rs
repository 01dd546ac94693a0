//! Cleaning executor module.
//!
//! Runs the cleaning stages in order, synchronously, on the calling thread:
//! read → classify → deduplicate → impute → aggregate.

use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::cleaner::DuplicateRemover;
use crate::config::CleaningConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::imputers::SentinelImputer;
use crate::profiler::SchemaClassifier;
use crate::reporting::StatsAggregator;
use crate::types::CleaningReport;

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct CleaningRun {
    pub dataset: Dataset,
    pub report: CleaningReport,
    /// Human-readable log of the completed steps.
    pub steps: Vec<String>,
}

/// Executes the cleaning stages on one dataset.
#[derive(Debug, Clone, Default)]
pub struct CleaningExecutor {
    imputer: SentinelImputer,
}

impl CleaningExecutor {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            imputer: SentinelImputer::new(config.sentinel.clone()),
        }
    }

    /// Read `path` and clean it. `started_at` is the start of the whole run.
    ///
    /// Any stage failure is returned as [`CleaningError::Processing`](crate::CleaningError::Processing)
    /// carrying the steps that completed before it.
    pub fn run(&self, path: &Path, started_at: Instant) -> Result<CleaningRun> {
        let mut steps = Vec::new();
        self.read_and_clean(path, started_at, &mut steps)
            .map_err(|e| e.processing(&steps))
    }

    /// Clean a dataset that is already in memory.
    pub fn clean(&self, original: &Dataset, started_at: Instant) -> Result<CleaningRun> {
        let mut steps = Vec::new();
        self.clean_stages(original, started_at, &mut steps)
            .map_err(|e| e.processing(&steps))
    }

    fn read_and_clean(
        &self,
        path: &Path,
        started_at: Instant,
        steps: &mut Vec<String>,
    ) -> Result<CleaningRun> {
        info!("Step 1: Reading {}", path.display());
        let original = Dataset::read_csv(path)?;
        steps.push(format!(
            "Read {} rows x {} columns from {}",
            original.height(),
            original.width(),
            path.display()
        ));

        self.clean_stages(&original, started_at, steps)
    }

    fn clean_stages(
        &self,
        original: &Dataset,
        started_at: Instant,
        steps: &mut Vec<String>,
    ) -> Result<CleaningRun> {
        info!("Step 2: Classifying columns...");
        let textual = SchemaClassifier::textual_columns(original)?;
        steps.push(format!(
            "Classified {} of {} columns as textual",
            textual.len(),
            original.width()
        ));

        info!("Step 3: Removing duplicate rows...");
        let deduped = DuplicateRemover::remove_duplicates(original)?;
        steps.push(format!(
            "Removed {} duplicate rows",
            original.height() - deduped.height()
        ));

        info!("Step 4: Filling missing text values...");
        let cleaned = self.imputer.impute(&deduped, &textual)?;
        steps.push(format!(
            "Filled missing values in {} textual columns with '{}'",
            textual.len(),
            self.imputer.sentinel()
        ));

        info!("Step 5: Aggregating statistics...");
        let report = StatsAggregator::aggregate(
            original,
            &cleaned,
            &textual,
            started_at.elapsed().as_secs_f64(),
        )?;
        steps.push(format!(
            "Report: {} -> {} rows, {} missing values filled",
            report.rows_before, report.rows_after, report.missing_filled
        ));

        info!("Cleaning completed in {:.2}s", report.elapsed_seconds);
        Ok(CleaningRun {
            dataset: cleaned,
            report,
            steps: steps.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleaningError;
    use crate::types::CellValue;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_run_cleans_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name,age\nann,30\nann,30\n,41\n").unwrap();

        let run = CleaningExecutor::default()
            .run(file.path(), Instant::now())
            .unwrap();

        assert_eq!(run.report.rows_before, 3);
        assert_eq!(run.report.rows_after, 2);
        assert_eq!(run.report.missing_filled, 1);
        assert_eq!(
            run.dataset.column_cells("name").unwrap(),
            vec![CellValue::from("ann"), CellValue::from("NA")]
        );
        assert_eq!(run.steps.len(), 5);
    }

    #[test]
    fn test_custom_sentinel_from_config() {
        let config = CleaningConfig::builder().sentinel("?").build().unwrap();
        let dataset = Dataset::from_csv_bytes(b"a,b\n,1\n").unwrap();

        let run = CleaningExecutor::new(&config)
            .clean(&dataset, Instant::now())
            .unwrap();

        assert_eq!(run.dataset.column_cells("a").unwrap(), vec![CellValue::from("?")]);
    }

    #[test]
    fn test_missing_file_is_wrapped() {
        let error = CleaningExecutor::default()
            .run(Path::new("/no/such/input.csv"), Instant::now())
            .unwrap_err();

        assert!(error.is_processing_failure());
        assert!(matches!(error.root_cause(), CleaningError::Io { .. }));
        assert!(error.processing_log().is_empty());
    }

    #[test]
    fn test_empty_schema_keeps_completed_steps() {
        let dataset = Dataset::from_frame(DataFrame::empty()).unwrap();

        let error = CleaningExecutor::default()
            .clean(&dataset, Instant::now())
            .unwrap_err();

        assert!(matches!(error.root_cause(), CleaningError::EmptySchema));
        assert_eq!(error.error_code(), "PROCESSING_FAILED");
    }
}
