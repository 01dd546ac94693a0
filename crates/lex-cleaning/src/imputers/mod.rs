//! Imputation of missing values.
//!
//! Textual columns get their missing cells replaced by a fixed sentinel
//! literal. Numeric columns are never imputed and keep their nulls.

mod sentinel;

pub use sentinel::SentinelImputer;
