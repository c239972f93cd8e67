//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::CsvReadOptions};

use crate::Error;

/// Read a CSV file with a header row, keeping every column as text.
///
/// Nothing is inferred: ids keep their leading zeros and numeric coercion is left to the caller.
/// Column names are trimmed of surrounding whitespace.
pub(crate) fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))?;
    standardize_columns(df)
}

/// Trim whitespace from every column name.
pub(crate) fn standardize_columns(mut df: DataFrame) -> Result<DataFrame> {
    let names = df.get_column_names().iter()
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();
    df.set_column_names(names)
        .context("[io::csv::read] Column names collide after trimming")?;
    Ok(df)
}

/// Borrow a text column as a vector of optional values.
pub(crate) fn text_column<'a>(df: &'a DataFrame, source_name: &'static str, column: &str) -> Result<Vec<Option<&'a str>>> {
    let values = df.column(column)
        .map_err(|_| Error::MissingColumn { source_name, column: column.to_string() })?
        .str()
        .with_context(|| format!("[io::csv::read] {source_name} column {column:?} is not text"))?;
    Ok(values.into_iter().collect())
}

/// Lenient numeric coercion: blanks, placeholders and non-finite values become `None`.
pub(crate) fn coerce_f64(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
