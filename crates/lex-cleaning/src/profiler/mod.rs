//! Schema profiling for loaded datasets.
//!
//! This module provides:
//! - Type inference for raw CSV columns (numeric vs string)
//! - Classification of the columns that take part in text imputation

mod type_inference;

pub(crate) use type_inference::infer_column;

use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use tracing::debug;

/// Identifies the textual columns of a dataset.
pub struct SchemaClassifier;

impl SchemaClassifier {
    /// Names of the columns whose declared type is string, in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::EmptySchema`] if the dataset has no columns.
    pub fn textual_columns(dataset: &Dataset) -> Result<Vec<String>> {
        let schema = dataset.schema();
        if schema.is_empty() {
            return Err(CleaningError::EmptySchema);
        }

        let textual: Vec<String> = schema
            .columns()
            .iter()
            .filter(|spec| spec.column_type.is_textual())
            .map(|spec| spec.name.clone())
            .collect();

        debug!(
            "Classified {} of {} columns as textual: {:?}",
            textual.len(),
            schema.len(),
            textual
        );
        Ok(textual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_textual_columns_in_schema_order() {
        let dataset = Dataset::from_csv_bytes(b"name,age,city\nann,30,\nbob,x,paris\n").unwrap();

        let textual = SchemaClassifier::textual_columns(&dataset).unwrap();
        assert_eq!(textual, vec!["name".to_string(), "age".to_string(), "city".to_string()]);
    }

    #[test]
    fn test_numeric_columns_are_excluded() {
        let dataset = Dataset::from_csv_bytes(b"id,score,label\n1,2.5,a\n2,,b\n").unwrap();

        let textual = SchemaClassifier::textual_columns(&dataset).unwrap();
        assert_eq!(textual, vec!["label".to_string()]);
    }

    #[test]
    fn test_empty_schema_fails() {
        let dataset = Dataset::from_frame(DataFrame::empty()).unwrap();

        let result = SchemaClassifier::textual_columns(&dataset);
        assert!(matches!(result, Err(CleaningError::EmptySchema)));
    }
}
