//! Run statistics and report output.
//!
//! [`StatsAggregator`] turns the before/after datasets of one run into a
//! [`CleaningReport`](crate::CleaningReport). [`RunSummary`] wraps that
//! report with the file names and step log for JSON output (`--json` and
//! `--emit-report` in the CLI).

mod stats;
mod summary;

pub use stats::StatsAggregator;
pub use summary::RunSummary;
