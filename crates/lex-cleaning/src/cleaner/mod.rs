//! Duplicate row removal.
//!
//! Two rows are duplicates when every cell is equal, missing cells
//! included. The first occurrence of each row is kept and the surviving
//! rows stay in their original relative order.

use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::Result;

/// Removes exact duplicate rows from a dataset.
pub struct DuplicateRemover;

impl DuplicateRemover {
    /// Return a copy of `dataset` without repeated rows.
    ///
    /// Applying it twice gives the same result as applying it once.
    pub fn remove_duplicates(dataset: &Dataset) -> Result<Dataset> {
        let rows = dataset.rows()?;
        let mut seen = HashSet::with_capacity(rows.len());
        let keep: Vec<bool> = rows.iter().map(|row| seen.insert(row)).collect();

        let removed = keep.iter().filter(|kept| !**kept).count();
        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok(dataset.clone());
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let frame = dataset.frame().filter(&mask)?;

        info!(
            "Removed {} duplicate rows ({} -> {})",
            removed,
            dataset.height(),
            frame.height()
        );
        Ok(dataset.with_frame(frame))
    }
}
