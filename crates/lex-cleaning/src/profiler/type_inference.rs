//! Type inference for freshly read CSV columns.
//!
//! Columns arrive as text. A column is numeric when every non-empty cell
//! parses as a finite number; it is then stored as `Int64` if every cell is
//! an integer and as `Float64` otherwise. Anything else stays `String`, with
//! empty cells turned into nulls.

use polars::prelude::*;
use tracing::debug;

use crate::types::ColumnType;
use crate::utils::{is_missing, is_numeric_dtype, parse_integer, parse_number};

/// Storage chosen for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericStorage {
    Integer,
    Float,
}

/// Infer the declared type of a column and return it in its typed storage.
pub(crate) fn infer_column(series: &Series) -> PolarsResult<(ColumnType, Series)> {
    if is_numeric_dtype(series.dtype()) {
        return Ok((ColumnType::Numeric, series.clone()));
    }

    let text = series.cast(&DataType::String)?;
    let ca = text.str()?;
    let name = series.name().clone();

    let storage = match numeric_storage(ca) {
        Some(storage) => storage,
        None => {
            debug!("Column '{}' inferred as string", name);
            let values: Vec<Option<&str>> = ca
                .into_iter()
                .map(|v| if is_missing(v) { None } else { v })
                .collect();
            return Ok((ColumnType::String, Series::new(name, values)));
        }
    };

    debug!("Column '{}' inferred as numeric ({:?})", name, storage);
    let typed = match storage {
        NumericStorage::Integer => {
            let values: Vec<Option<i64>> = ca
                .into_iter()
                .map(|v| v.and_then(parse_integer))
                .collect();
            Series::new(name, values)
        }
        NumericStorage::Float => {
            let values: Vec<Option<f64>> = ca
                .into_iter()
                .map(|v| v.and_then(parse_number))
                .collect();
            Series::new(name, values)
        }
    };

    Ok((ColumnType::Numeric, typed))
}

/// `None` when the column is textual, including when it has no values at all.
fn numeric_storage(ca: &StringChunked) -> Option<NumericStorage> {
    let mut seen_value = false;
    let mut all_integers = true;

    for value in ca.into_iter().filter(|v| !is_missing(*v)).flatten() {
        seen_value = true;
        if all_integers && parse_integer(value).is_some() {
            continue;
        }
        all_integers = false;
        parse_number(value)?;
    }

    if !seen_value {
        return None;
    }

    Some(if all_integers {
        NumericStorage::Integer
    } else {
        NumericStorage::Float
    })
}
