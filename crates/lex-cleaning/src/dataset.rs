//! In-memory dataset and CSV I/O.
//!
//! A [`Dataset`] is a fully materialized table backed by a Polars
//! `DataFrame` together with the [`ColumnSchema`] inferred when it was read.
//! Columns are stored as `String`, `Int64` or `Float64`; empty CSV cells are
//! nulls. Every transformation returns a new `Dataset`, leaving the input
//! untouched.

use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CleaningError, Result};
use crate::profiler::infer_column;
use crate::types::{CellValue, ColumnSchema, ColumnSpec};
use crate::utils::series_cells;

#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    schema: ColumnSchema,
}

// Datasets are handed from the cleaning worker back to the orchestrator.
static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    /// Read a whole CSV file into memory and infer its column types.
    ///
    /// # Errors
    ///
    /// - [`CleaningError::Io`] if the file cannot be opened
    /// - [`CleaningError::EmptySchema`] if the file has no header
    /// - [`CleaningError::MalformedInput`] if the content is not valid CSV
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CleaningError::io(path, e))?;
        let metadata = file.metadata().map_err(|e| CleaningError::io(path, e))?;
        if metadata.len() == 0 {
            return Err(CleaningError::EmptySchema);
        }

        info!("Reading CSV from: {}", path.display());
        let frame = csv_read_options()
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| map_read_error(path, e))?;

        let dataset = Self::from_frame(frame)?;
        info!("Dataset loaded: {:?}", dataset.frame.shape());
        Ok(dataset)
    }

    /// Parse CSV content already held in memory.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(CleaningError::EmptySchema);
        }
        let frame = csv_read_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| map_read_error(Path::new("<memory>"), e))?;

        Self::from_frame(frame)
    }

    /// Build a dataset from a DataFrame, inferring the declared type of each column.
    ///
    /// Numeric columns are kept as they are; text columns go through the
    /// numeric/string inference policy.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(frame.width());
        let mut specs = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            let (column_type, typed) = infer_column(column.as_materialized_series())?;
            specs.push(ColumnSpec {
                name: typed.name().to_string(),
                column_type,
            });
            columns.push(Column::from(typed));
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
            schema: ColumnSchema::new(specs),
        })
    }

    /// A dataset with the same schema but new contents.
    pub(crate) fn with_frame(&self, frame: DataFrame) -> Self {
        Self {
            frame,
            schema: self.schema.clone(),
        }
    }

    /// Write the dataset as a single CSV file with a header row.
    ///
    /// An existing file at `path` is overwritten.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| CleaningError::io(path, e))?;
        let mut frame = self.frame.clone();

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut frame)?;

        debug!("Wrote {} rows to {}", frame.height(), path.display());
        Ok(())
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// All values of one column, in row order.
    pub fn column_cells(&self, name: &str) -> Result<Vec<CellValue>> {
        let column = self.column(name)?;
        Ok(series_cells(column.as_materialized_series())?)
    }

    /// Number of missing cells in one column.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.null_count())
    }

    /// Row-major copy of the whole table.
    pub fn rows(&self) -> Result<Vec<Vec<CellValue>>> {
        let mut rows = vec![Vec::with_capacity(self.width()); self.height()];

        for column in self.frame.get_columns() {
            let cells = series_cells(column.as_materialized_series())?;
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        Ok(rows)
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
    }
}

/// Every column is read as text; typing is done by [`infer_column`].
fn csv_read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"')),
        )
}

fn map_read_error(path: &Path, error: PolarsError) -> CleaningError {
    match error {
        PolarsError::NoData(_) => CleaningError::EmptySchema,
        PolarsError::IO { error, .. } => CleaningError::io(
            path,
            std::io::Error::new(error.kind(), error.to_string()),
        ),
        other => CleaningError::MalformedInput(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_csv_bytes_infers_schema() {
        let dataset = Dataset::from_csv_bytes(b"name,age,score\nann,30,1.5\nbob,,2\n").unwrap();

        assert_eq!(dataset.height(), 2);
        assert_eq!(dataset.width(), 3);
        assert_eq!(dataset.schema().column_type("name"), Some(ColumnType::String));
        assert_eq!(dataset.schema().column_type("age"), Some(ColumnType::Numeric));
        assert_eq!(dataset.schema().column_type("score"), Some(ColumnType::Numeric));
        assert_eq!(dataset.missing_count("age").unwrap(), 1);
    }

    #[test]
    fn test_rows_are_row_major() {
        let dataset = Dataset::from_csv_bytes(b"name,age\nann,30\n,31\n").unwrap();

        assert_eq!(
            dataset.rows().unwrap(),
            vec![
                vec![CellValue::from("ann"), CellValue::Integer(30)],
                vec![CellValue::Null, CellValue::Integer(31)],
            ]
        );
    }

    #[test]
    fn test_header_only_file() {
        let dataset = Dataset::from_csv_bytes(b"a,b\n").unwrap();

        assert_eq!(dataset.height(), 0);
        assert_eq!(dataset.width(), 2);
        assert_eq!(dataset.schema().column_type("a"), Some(ColumnType::String));
    }

    #[test]
    fn test_empty_input_is_empty_schema() {
        let result = Dataset::from_csv_bytes(b"");
        assert!(matches!(result, Err(CleaningError::EmptySchema)));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result = Dataset::from_csv_bytes(b"name\n\xff\xfe\n");
        assert!(matches!(result, Err(CleaningError::MalformedInput(_))));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = Dataset::read_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(CleaningError::Io { .. })));
    }

    #[test]
    fn test_unknown_column() {
        let dataset = Dataset::from_csv_bytes(b"a\n1\n").unwrap();
        assert!(matches!(
            dataset.missing_count("b"),
            Err(CleaningError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let dataset = Dataset::from_csv_bytes(b"name,age\nann,30\nbob,41\n").unwrap();

        dataset.write_csv(&path).unwrap();
        let reread = Dataset::read_csv(&path).unwrap();

        assert_eq!(reread.schema(), dataset.schema());
        assert_eq!(reread.rows().unwrap(), dataset.rows().unwrap());
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        Dataset::from_csv_bytes(b"x\nonly\n")
            .unwrap()
            .write_csv(&path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "x\nonly\n");
    }
}
