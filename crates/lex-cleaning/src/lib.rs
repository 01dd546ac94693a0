//! CSV Cleaning Pipeline Library
//!
//! A small data cleaning library built with Rust, Polars and Tokio.
//!
//! # Overview
//!
//! Given a CSV file the pipeline:
//!
//! - **Reads** the whole file into memory and infers each column as numeric or string
//! - **Classifies** the textual columns
//! - **Deduplicates** rows, keeping the first occurrence of each
//! - **Imputes** missing text cells with a sentinel (`"NA"` by default)
//! - **Reports** row counts, column count, filled values and elapsed time
//!
//! While a run is in flight a synthetic 1–100% progress ramp is emitted to
//! subscribers from its own task. The ramp can be cancelled; cleaning cannot.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_cleaning::{CleaningConfig, Orchestrator};
//!
//! let config = CleaningConfig::builder()
//!     .sentinel("NA")
//!     .progress_interval_ms(50)
//!     .build()?;
//!
//! let orchestrator = Orchestrator::new(config);
//! orchestrator.on_progress(|event| {
//!     println!("[{:>3}%] {:.2}s", event.percent, event.elapsed_seconds);
//! });
//!
//! orchestrator.load("data/customers.csv")?;
//! let handle = orchestrator.process()?;
//! let report = handle.wait().await?;
//!
//! print!("{}", report.to_text());
//! orchestrator.export("output/customers_clean.csv")?;
//! ```
//!
//! # Using the stages directly
//!
//! Every stage is also usable without the orchestrator:
//!
//! ```rust,ignore
//! use lex_cleaning::{Dataset, DuplicateRemover, SchemaClassifier, SentinelImputer};
//!
//! let dataset = Dataset::read_csv("data.csv")?;
//! let textual = SchemaClassifier::textual_columns(&dataset)?;
//! let deduped = DuplicateRemover::remove_duplicates(&dataset)?;
//! let cleaned = SentinelImputer::default().impute(&deduped, &textual)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DuplicateRemover;
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use dataset::Dataset;
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::SentinelImputer;
pub use pipeline::{
    CancellationToken, ChannelProgressSubscriber, CleaningExecutor, CleaningRun,
    ClosureProgressSubscriber, Orchestrator, ProcessHandle, ProgressControl, ProgressEvent,
    ProgressHandle, ProgressReporter, ProgressState, ProgressSubscriber,
};
pub use profiler::SchemaClassifier;
pub use reporting::{RunSummary, StatsAggregator};
pub use types::{
    CellValue, CleaningReport, ColumnSchema, ColumnSpec, ColumnType, LoadResult,
    PipelineFailure, PipelineState,
};
