//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Configurations can also be
//! read from JSON so the CLI and other front ends share one format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CleaningError, Result};

/// Value written into missing cells of textual columns by default.
pub const DEFAULT_SENTINEL: &str = "NA";

/// Default delay between two progress events, in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 50;

/// Upper bound for the progress cadence. A full ramp is 100 intervals.
pub const MAX_PROGRESS_INTERVAL_MS: u64 = 10_000;

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .sentinel("MISSING")
///     .progress_interval_ms(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Literal written into missing cells of textual columns.
    /// Default: "NA"
    pub sentinel: String,

    /// Delay before each of the 100 progress events, in milliseconds.
    /// Default: 50
    pub progress_interval_ms: u64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Read and validate a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CleaningError::io(path, e))?;
        let config: CleaningConfig = serde_json::from_str(&content)
            .map_err(|e| CleaningError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Cadence of the progress ramp.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.sentinel.is_empty() {
            return Err(ConfigValidationError::EmptySentinel);
        }

        if self.progress_interval_ms > MAX_PROGRESS_INTERVAL_MS {
            return Err(ConfigValidationError::InvalidProgressInterval(
                self.progress_interval_ms,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Sentinel value must not be empty")]
    EmptySentinel,

    #[error("Invalid progress interval: {0}ms (must be at most 10000ms)")]
    InvalidProgressInterval(u64),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    sentinel: Option<String>,
    progress_interval_ms: Option<u64>,
}

impl CleaningConfigBuilder {
    /// Set the literal used to fill missing textual cells.
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    /// Set the delay between progress events.
    ///
    /// A value of 0 emits the ramp as fast as the runtime schedules it.
    pub fn progress_interval_ms(mut self, interval_ms: u64) -> Self {
        self.progress_interval_ms = Some(interval_ms);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            sentinel: self
                .sentinel
                .unwrap_or_else(|| DEFAULT_SENTINEL.to_string()),
            progress_interval_ms: self
                .progress_interval_ms
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL_MS),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.sentinel, "NA");
        assert_eq!(config.progress_interval_ms, 50);
        assert_eq!(config.progress_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .sentinel("MISSING")
            .progress_interval_ms(5)
            .build()
            .unwrap();

        assert_eq!(config.sentinel, "MISSING");
        assert_eq!(config.progress_interval_ms, 5);
    }

    #[test]
    fn test_validation_empty_sentinel() {
        let result = CleaningConfig::builder().sentinel("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptySentinel
        ));
    }

    #[test]
    fn test_validation_interval_too_large() {
        let result = CleaningConfig::builder()
            .progress_interval_ms(MAX_PROGRESS_INTERVAL_MS + 1)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidProgressInterval(_)
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CleaningConfig = serde_json::from_str(r#"{ "sentinel": "unknown" }"#)
            .expect("Should deserialize with defaults for missing fields");
        assert_eq!(config.sentinel, "unknown");
        assert_eq!(config.progress_interval_ms, DEFAULT_PROGRESS_INTERVAL_MS);
    }

    #[test]
    fn test_config_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sentinel": "N/A", "progress_interval_ms": 0 }}"#).unwrap();

        let config = CleaningConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.sentinel, "N/A");
        assert_eq!(config.progress_interval_ms, 0);
    }

    #[test]
    fn test_config_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sentinel": "" }}"#).unwrap();

        let error = CleaningConfig::from_json_file(file.path()).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }
}
