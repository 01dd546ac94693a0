//! Shared utilities for the cleaning pipeline.
//!
//! This module contains helpers used across the profiler, cleaner and
//! imputers to keep value parsing and cell extraction consistent.

use polars::prelude::*;

use crate::types::CellValue;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// A raw CSV cell counts as missing when it is null or the empty string.
#[inline]
pub fn is_missing(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// Parse a cell as a signed 64-bit integer, ignoring surrounding whitespace.
pub fn parse_integer(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Parse a cell as a finite number, ignoring surrounding whitespace.
///
/// `NaN` and infinities are rejected so that words like "nan" or "Infinity"
/// keep their column textual.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::utils::parse_number;
///
/// assert_eq!(parse_number(" 3.5 "), Some(3.5));
/// assert_eq!(parse_number("1e3"), Some(1000.0));
/// assert_eq!(parse_number("NaN"), None);
/// ```
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Cell Extraction
// =============================================================================

/// Read every value of a Series as [`CellValue`]s, in row order.
///
/// Integer columns become [`CellValue::Integer`], float columns
/// [`CellValue::Float`], everything else is rendered as text.
pub fn series_cells(series: &Series) -> PolarsResult<Vec<CellValue>> {
    let dtype = series.dtype();

    if is_integer_dtype(dtype) {
        let casted = series.cast(&DataType::Int64)?;
        return Ok(casted
            .i64()?
            .into_iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
            .collect());
    }

    if is_numeric_dtype(dtype) {
        let casted = series.cast(&DataType::Float64)?;
        return Ok(casted
            .f64()?
            .into_iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Float))
            .collect());
    }

    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.to_string())))
        .collect())
}

// =============================================================================
// Tests
// =============================================================================
