//! Constant-value imputation for textual columns.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::DEFAULT_SENTINEL;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result, ResultExt};

/// Fills missing cells of textual columns with a sentinel string.
#[derive(Debug, Clone)]
pub struct SentinelImputer {
    sentinel: String,
}

impl Default for SentinelImputer {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl SentinelImputer {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Return a copy of `dataset` where every missing cell of the listed
    /// columns holds the sentinel.
    ///
    /// Non-missing cells, numeric columns and row count are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::ColumnNotFound`] if a listed column does not
    /// exist in the dataset.
    pub fn impute(&self, dataset: &Dataset, textual_columns: &[String]) -> Result<Dataset> {
        let mut frame = dataset.frame().clone();

        for name in textual_columns {
            match dataset.schema().column_type(name) {
                None => return Err(CleaningError::ColumnNotFound(name.clone())),
                Some(column_type) if !column_type.is_textual() => {
                    warn!("Skipping imputation of numeric column '{}'", name);
                    continue;
                }
                Some(_) => {}
            }

            let column = frame
                .column(name)
                .map_err(|_| CleaningError::ColumnNotFound(name.clone()))?;
            let missing = column.null_count();
            if missing == 0 {
                continue;
            }

            let filled = self.fill_nulls(column.as_materialized_series())?;
            frame
                .replace(name, filled)
                .context(format!("Failed to fill column '{}'", name))?;
            debug!(
                "Filled {} missing values in '{}' with '{}'",
                missing, name, self.sentinel
            );
        }

        Ok(dataset.with_frame(frame))
    }

    fn fill_nulls(&self, series: &Series) -> PolarsResult<Series> {
        let ca = series.str()?;
        let values: Vec<&str> = ca
            .into_iter()
            .map(|v| v.unwrap_or(self.sentinel.as_str()))
            .collect();
        Ok(Series::new(series.name().clone(), values))
    }
}
