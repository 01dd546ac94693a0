//! Custom error types for the cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Stage-local
//! failures (I/O, malformed CSV, empty schema) are wrapped into a single
//! [`CleaningError::Processing`] by the executor so that callers always see
//! one error per failed run, carrying the root cause and the steps that had
//! already completed.
//!
//! Errors are serializable as `{ code, message }` so a front end can display
//! them without knowing the Rust types.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::PipelineState;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// File missing or unreadable (load, read or write).
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input has no columns.
    #[error("Dataset has no columns")]
    EmptySchema,

    /// The input could not be parsed as CSV.
    #[error("Malformed CSV input: {0}")]
    MalformedInput(String),

    /// A processing run is already in flight on this orchestrator.
    #[error("A processing run is already in progress")]
    AlreadyProcessing,

    /// A cleaning stage failed. Wraps the root cause and the log of completed steps.
    #[error("Processing failed: {source}")]
    Processing {
        #[source]
        source: Box<CleaningError>,
        log: Vec<String>,
    },

    /// Export could not be performed.
    #[error("Export to '{}' failed: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    /// Operation is not allowed in the current pipeline state.
    #[error("Cannot {operation} while pipeline is {state}")]
    InvalidState {
        operation: &'static str,
        state: PipelineState,
    },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (e.g., worker join failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleaningError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a stage failure into a [`CleaningError::Processing`].
    ///
    /// An error that is already a processing error is returned unchanged.
    pub fn processing(self, log: &[String]) -> Self {
        match self {
            already @ CleaningError::Processing { .. } => already,
            source => CleaningError::Processing {
                source: Box::new(source),
                log: log.to_vec(),
            },
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::EmptySchema => "EMPTY_SCHEMA",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::AlreadyProcessing => "ALREADY_PROCESSING",
            Self::Processing { .. } => "PROCESSING_FAILED",
            Self::Export { .. } => "EXPORT_FAILED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, looking through processing and context wrappers.
    pub fn root_cause(&self) -> &CleaningError {
        match self {
            Self::Processing { source, .. } | Self::WithContext { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Steps that completed before a processing failure, if any.
    pub fn processing_log(&self) -> &[String] {
        match self {
            Self::Processing { log, .. } => log,
            Self::WithContext { source, .. } => source.processing_log(),
            _ => &[],
        }
    }

    /// Check if this error came out of a processing run.
    pub fn is_processing_failure(&self) -> bool {
        matches!(self.without_context(), Self::Processing { .. })
    }

    fn without_context(&self) -> &CleaningError {
        match self {
            Self::WithContext { source, .. } => source.without_context(),
            other => other,
        }
    }
}

/// Serialize implementation for front end IPC.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(CleaningError::EmptySchema.error_code(), "EMPTY_SCHEMA");
        assert_eq!(
            CleaningError::AlreadyProcessing.error_code(),
            "ALREADY_PROCESSING"
        );
        assert_eq!(
            CleaningError::ColumnNotFound("name".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_processing_wraps_root_cause_and_log() {
        let log = vec!["Loaded 3 rows x 2 columns".to_string()];
        let error = CleaningError::EmptySchema.processing(&log);

        assert_eq!(error.error_code(), "PROCESSING_FAILED");
        assert!(matches!(error.root_cause(), CleaningError::EmptySchema));
        assert_eq!(error.processing_log(), log.as_slice());
        assert!(error.to_string().contains("Dataset has no columns"));
    }

    #[test]
    fn test_processing_is_not_double_wrapped() {
        let error = CleaningError::MalformedInput("bad row".to_string())
            .processing(&[])
            .processing(&["ignored".to_string()]);

        assert!(matches!(
            error.root_cause(),
            CleaningError::MalformedInput(_)
        ));
        assert!(error.processing_log().is_empty());
    }

    #[test]
    fn test_io_error_message_names_path() {
        let error = CleaningError::io(
            "/tmp/missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(error.to_string().contains("/tmp/missing.csv"));
        assert_eq!(error.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::ColumnNotFound("city".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("city"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::EmptySchema.with_context("During classification");
        assert!(error.to_string().contains("During classification"));
        assert_eq!(error.error_code(), "EMPTY_SCHEMA");
    }

    #[test]
    fn test_invalid_state_message() {
        let error = CleaningError::InvalidState {
            operation: "process",
            state: PipelineState::Idle,
        };
        assert_eq!(error.to_string(), "Cannot process while pipeline is idle");
    }
}
