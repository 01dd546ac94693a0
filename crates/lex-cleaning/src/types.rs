use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

// ============================================================================
// Schema Types
// ============================================================================

/// Declared type of a column, inferred once when the dataset is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-empty cell parsed as a number.
    Numeric,
    /// Anything else, including entirely empty columns.
    String,
}

impl ColumnType {
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::String)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => f.write_str("numeric"),
            ColumnType::String => f.write_str("string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

/// Ordered list of `(name, declared type)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }
}

// ============================================================================
// Cell Values
// ============================================================================

/// A single typed cell of a [`Dataset`](crate::Dataset) row.
///
/// `Integer` and `Float` are the two storage forms of a numeric column.
/// Floats compare and hash by bit pattern so rows can be used as hash keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Integer(v) => v.hash(state),
            CellValue::Float(v) => v.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

// ============================================================================
// Run Results
// ============================================================================

/// Summary of one successful cleaning run.
///
/// Created once per run and superseded, never merged, by the next one.
/// The human-readable form is produced by [`CleaningReport::to_text`] so the
/// text and the numbers always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_processed: usize,
    /// Missing cells in textual columns of the original (pre-dedup) dataset.
    pub missing_filled: usize,
    pub elapsed_seconds: f64,
}

impl CleaningReport {
    /// Five-line summary, elapsed time with two decimals.
    pub fn to_text(&self) -> String {
        format!(
            "Rows before cleaning: {}\n\
             Rows after cleaning: {}\n\
             Columns processed: {}\n\
             Missing values filled: {}\n\
             Time elapsed: {:.2} seconds\n",
            self.rows_before,
            self.rows_after,
            self.columns_processed,
            self.missing_filled,
            self.elapsed_seconds
        )
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Returned by a successful `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Snapshot of the error that moved the pipeline to [`PipelineState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFailure {
    pub code: String,
    pub message: String,
    /// Steps that completed before the failure.
    pub log: Vec<String>,
}

impl From<&crate::error::CleaningError> for PipelineFailure {
    fn from(error: &crate::error::CleaningError) -> Self {
        Self {
            code: error.root_cause().error_code().to_string(),
            message: error.to_string(),
            log: error.processing_log().to_vec(),
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle of a [`Orchestrator`](crate::Orchestrator).
///
/// `Idle → Loaded → Processing → Completed | Failed`; a new load from any
/// state except `Processing` goes back to `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Loaded,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Loaded => "loaded",
            PipelineState::Processing => "processing",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_report_text_has_five_lines() {
        let report = CleaningReport {
            rows_before: 5,
            rows_after: 4,
            columns_processed: 3,
            missing_filled: 1,
            elapsed_seconds: 1.23456,
        };

        let text = report.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Rows before cleaning: 5",
                "Rows after cleaning: 4",
                "Columns processed: 3",
                "Missing values filled: 1",
                "Time elapsed: 1.23 seconds",
            ]
        );
        assert_eq!(report.to_string(), text);
        assert_eq!(report.rows_removed(), 1);
    }

    #[test]
    fn test_cell_value_null_equals_null() {
        assert_eq!(CellValue::Null, CellValue::Null);
        assert_ne!(CellValue::Null, CellValue::Text(String::new()));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }

    #[test]
    fn test_cell_value_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(vec![CellValue::from("a"), CellValue::Float(2.5), CellValue::Null]);
        assert!(set.contains(&vec![
            CellValue::from("a"),
            CellValue::Float(2.5),
            CellValue::Null
        ]));
        assert!(!set.contains(&vec![
            CellValue::from("a"),
            CellValue::Float(2.5),
            CellValue::from("")
        ]));
    }

    #[test]
    fn test_schema_lookup() {
        let schema = ColumnSchema::new(vec![
            ColumnSpec {
                name: "name".to_string(),
                column_type: ColumnType::String,
            },
            ColumnSpec {
                name: "age".to_string(),
                column_type: ColumnType::Numeric,
            },
        ]);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.column_type("age"), Some(ColumnType::Numeric));
        assert_eq!(schema.column_type("missing"), None);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn test_pipeline_state_json_values() {
        let json = serde_json::to_string(&PipelineState::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }
}
