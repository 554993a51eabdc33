//! CSV loading and cleaning

use crate::error::{CropYieldError, Result};
use super::schema::{self, MIN_YEAR, NUMERIC_COLUMNS, REQUIRED_COLUMNS, YEAR};
use super::TrainingDataset;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Load the training dataset at `path` and clean it.
///
/// Every column is read as text first so numeric coercion follows one rule: values that do
/// not parse become null instead of failing the whole file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<TrainingDataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CropYieldError::DatasetNotFound(path.to_path_buf()));
    }

    let start = Instant::now();
    let file = File::open(path)?;

    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;

    let rows_read = raw.height();
    let frame = normalize_headers(raw)?;
    let frame = coerce_columns(frame)?;
    let frame = drop_invalid_rows(frame)?;

    info!(
        path = %path.display(),
        rows_read,
        rows_kept = frame.height(),
        columns = frame.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded training dataset"
    );

    Ok(TrainingDataset::new(path.to_path_buf(), frame, rows_read))
}

/// Rename localized headers to their canonical names. Unknown headers are left alone.
pub(crate) fn normalize_headers(mut df: DataFrame) -> Result<DataFrame> {
    let headers: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    for header in &headers {
        let Some(canonical) = schema::canonical_name(header) else {
            debug!(column = %header, "Keeping unrecognized column");
            continue;
        };
        if header == canonical {
            continue;
        }
        if headers.iter().any(|h| h == canonical) {
            warn!(column = %header, canonical, "Canonical column already present, keeping original header");
            continue;
        }
        df.rename(header, canonical.into())?;
    }

    Ok(df)
}

/// Parse numeric columns (parse or null) and trim the categorical ones.
pub(crate) fn coerce_columns(mut df: DataFrame) -> Result<DataFrame> {
    for name in NUMERIC_COLUMNS {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let text = column.as_materialized_series().cast(&DataType::String)?;
        let values = text.str()?;

        let parsed: Float64Chunked = values
            .into_iter()
            .map(|v| v.and_then(parse_number))
            .map(|v| if *name == YEAR { v.and_then(integral_year) } else { v })
            .collect();

        df.with_column(parsed.with_name((*name).into()).into_series())?;
    }

    for name in schema::CATEGORICAL_FEATURES {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let text = column.as_materialized_series().cast(&DataType::String)?;
        let values = text.str()?;

        let trimmed: StringChunked = values
            .into_iter()
            .map(|v| v.map(str::trim).filter(|s| !s.is_empty()))
            .collect();

        df.with_column(trimmed.with_name((*name).into()).into_series())?;
    }

    Ok(df)
}

/// Drop rows missing a required value and rows dated before [`MIN_YEAR`].
pub(crate) fn drop_invalid_rows(df: DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for name in REQUIRED_COLUMNS {
        let Ok(column) = df.column(name) else {
            // Reported by the trainer as a schema error
            continue;
        };
        let nulls = column.as_materialized_series().is_null();
        for (flag, is_null) in keep.iter_mut().zip(nulls.into_iter()) {
            *flag &= !is_null.unwrap_or(true);
        }
    }

    if let Ok(column) = df.column(YEAR) {
        let years = column.as_materialized_series().f64()?;
        for (flag, year) in keep.iter_mut().zip(years.into_iter()) {
            *flag &= year.map_or(false, |y| y >= MIN_YEAR as f64);
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut cleaned = df.filter(&mask)?;

    let years = match cleaned.column(YEAR) {
        Ok(column) => Some(integral_years(column.as_materialized_series())?),
        Err(_) => None,
    };
    if let Some(years) = years {
        cleaned.with_column(years)?;
    }

    Ok(cleaned)
}

fn integral_years(series: &Series) -> Result<Series> {
    let years: Int64Chunked = series
        .f64()?
        .into_iter()
        .map(|v| v.map(|y| y as i64))
        .collect();
    Ok(years.with_name(YEAR.into()).into_series())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole years that fit in an `i64`, anything else is null.
fn integral_year(year: f64) -> Option<f64> {
    Some(year).filter(|y| y.fract() == 0.0 && y.abs() < i64::MAX as f64)
}
