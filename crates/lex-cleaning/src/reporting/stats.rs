//! Statistics for a finished cleaning run.

use tracing::debug;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::CleaningReport;

/// Builds the [`CleaningReport`] of a run.
pub struct StatsAggregator;

impl StatsAggregator {
    /// Compute the report from the original and cleaned datasets.
    ///
    /// `missing_filled` counts the missing cells of the textual columns in
    /// `original`, before deduplication. `elapsed_seconds` is measured by the
    /// caller from the start of the run.
    pub fn aggregate(
        original: &Dataset,
        cleaned: &Dataset,
        textual_columns: &[String],
        elapsed_seconds: f64,
    ) -> Result<CleaningReport> {
        let mut missing_filled = 0;
        for name in textual_columns {
            missing_filled += original.missing_count(name)?;
        }

        let report = CleaningReport {
            rows_before: original.height(),
            rows_after: cleaned.height(),
            columns_processed: original.width(),
            missing_filled,
            elapsed_seconds,
        };

        debug!("Aggregated report: {:?}", report);
        Ok(report)
    }
}
