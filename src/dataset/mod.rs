//! Training dataset loading
//!
//! Reads the historical yield file, maps its localized headers onto the canonical schema,
//! coerces numeric columns and drops rows the model cannot learn from.

mod loader;
pub mod schema;

pub use loader::load_dataset;

use crate::error::{CropYieldError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One cleaned row of the training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub crop: String,
    pub region: String,
    pub year: i64,
    pub sown_area_kha: f64,
    pub yield_10kt: f64,
    pub yield_per_ha: Option<f64>,
    pub avg_price_yuan_per_ton: f64,
    pub crop_category: Option<String>,
    pub administrative_level: Option<String>,
    pub parent_region: Option<String>,
    pub data_source: Option<String>,
    pub collected_at: Option<String>,
}

/// First rows of the dataset in a JSON-friendly shape
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Summary figures reported by `info` and the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub source: String,
    pub rows: usize,
    pub rows_dropped: usize,
    pub columns: Vec<String>,
    pub crops: Vec<String>,
    pub regions: Vec<String>,
    pub year_min: Option<i64>,
    pub year_max: Option<i64>,
}

/// Immutable cleaned training data
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    source: PathBuf,
    frame: DataFrame,
    rows_read: usize,
}

impl TrainingDataset {
    pub(crate) fn new(source: PathBuf, frame: DataFrame, rows_read: usize) -> Self {
        Self { source, frame, rows_read }
    }

    /// Build a dataset from an in-memory frame, applying the same cleaning as the file loader.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let rows_read = frame.height();
        let frame = loader::normalize_headers(frame)?;
        let frame = loader::coerce_columns(frame)?;
        let frame = loader::drop_invalid_rows(frame)?;
        Ok(Self::new(PathBuf::from("<memory>"), frame, rows_read))
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File name of the source, used in health reports
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Rows present in the source file before cleaning
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.len())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// The cleaned frame backing this dataset
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Materialize the cleaned rows in source order.
    pub fn records(&self) -> Result<Vec<CleanedRecord>> {
        self.ensure_required_columns()?;

        let crops = self.strings(schema::CROP)?;
        let regions = self.strings(schema::REGION)?;
        let years = self.integers(schema::YEAR)?;
        let areas = self.floats(schema::SOWN_AREA_KHA)?;
        let yields = self.floats(schema::YIELD_10KT)?;
        let prices = self.floats(schema::AVG_PRICE_YUAN_PER_TON)?;
        let per_ha = self.floats(schema::YIELD_PER_HA).unwrap_or_else(|_| vec![None; self.len()]);
        let optional_text = |name: &str| self.strings(name).unwrap_or_else(|_| vec![None; self.len()]);
        let categories = optional_text(schema::CROP_CATEGORY);
        let levels = optional_text(schema::ADMINISTRATIVE_LEVEL);
        let parents = optional_text(schema::PARENT_REGION);
        let sources = optional_text(schema::DATA_SOURCE);
        let collected = optional_text(schema::COLLECTED_AT);

        (0..self.len())
            .map(|i| {
                Ok(CleanedRecord {
                    crop: required(crops[i].clone(), schema::CROP, i)?,
                    region: required(regions[i].clone(), schema::REGION, i)?,
                    year: required(years[i], schema::YEAR, i)?,
                    sown_area_kha: required(areas[i], schema::SOWN_AREA_KHA, i)?,
                    yield_10kt: required(yields[i], schema::YIELD_10KT, i)?,
                    yield_per_ha: per_ha[i],
                    avg_price_yuan_per_ton: required(prices[i], schema::AVG_PRICE_YUAN_PER_TON, i)?,
                    crop_category: categories[i].clone(),
                    administrative_level: levels[i].clone(),
                    parent_region: parents[i].clone(),
                    data_source: sources[i].clone(),
                    collected_at: collected[i].clone(),
                })
            })
            .collect()
    }

    /// First `limit` rows with every column, including the unused ones.
    pub fn preview(&self, limit: usize) -> DatasetPreview {
        let head = self.frame.head(Some(limit));
        let columns = self.column_names();

        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|col| (col.name().to_string(), any_value_to_json(col.get(i))))
                    .collect()
            })
            .collect();

        DatasetPreview { columns, rows }
    }

    /// Distinct crops and regions plus the covered year range.
    pub fn summary(&self) -> Result<DatasetSummary> {
        let records = self.records()?;

        let crops: BTreeSet<&str> = records.iter().map(|r| r.crop.as_str()).collect();
        let regions: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();

        Ok(DatasetSummary {
            source: self.source.display().to_string(),
            rows: self.len(),
            rows_dropped: self.rows_dropped(),
            columns: self.column_names(),
            crops: crops.into_iter().map(String::from).collect(),
            regions: regions.into_iter().map(String::from).collect(),
            year_min: records.iter().map(|r| r.year).min(),
            year_max: records.iter().map(|r| r.year).max(),
        })
    }

    /// Names of required columns absent from the cleaned frame
    pub fn missing_columns<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        required
            .into_iter()
            .filter(|name| !self.has_column(name))
            .map(String::from)
            .collect()
    }

    fn ensure_required_columns(&self) -> Result<()> {
        let missing = self.missing_columns(schema::REQUIRED_COLUMNS.iter().copied());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CropYieldError::SchemaError { missing })
        }
    }

    fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| CropYieldError::FeatureNotFound(name.to_string()))
    }

    fn strings(&self, name: &str) -> Result<Vec<Option<String>>> {
        let text = self.series(name)?.cast(&DataType::String)?;
        Ok(text.str()?.into_iter().map(|v| v.map(String::from)).collect())
    }

    fn floats(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = self.series(name)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    fn integers(&self, name: &str) -> Result<Vec<Option<i64>>> {
        let values = self.series(name)?.cast(&DataType::Int64)?;
        Ok(values.i64()?.into_iter().collect())
    }
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| CropYieldError::DataError(format!("row {} has no value for '{}'", row, column)))
}

fn any_value_to_json(value: PolarsResult<AnyValue<'_>>) -> serde_json::Value {
    match value {
        Ok(AnyValue::Float64(v)) => serde_json::json!(v),
        Ok(AnyValue::Float32(v)) => serde_json::json!(v),
        Ok(AnyValue::Int64(v)) => serde_json::json!(v),
        Ok(AnyValue::Int32(v)) => serde_json::json!(v),
        Ok(AnyValue::String(v)) => serde_json::json!(v),
        Ok(AnyValue::StringOwned(v)) => serde_json::json!(v.as_str()),
        Ok(AnyValue::Boolean(v)) => serde_json::json!(v),
        Ok(AnyValue::Null) | Err(_) => serde_json::Value::Null,
        Ok(other) => serde_json::json!(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> TrainingDataset {
        let frame = df!(
            "作物" => &["小麦", "玉米", "水稻"],
            "地区" => &["河南", "山东", "湖南"],
            "年份" => &["2020", "2021", "2022"],
            "播种面积(千公顷)" => &["5700", "3900", "4000"],
            "产量(万吨)" => &["3750", "2700", "2600"],
            "单产(吨/公顷)" => &["6.58", "", "6.5"],
            "平均价格(元/吨)" => &["2300", "2100", "2600"],
            "数据来源" => &["统计年鉴", "统计年鉴", "统计年鉴"],
        )
        .unwrap();
        TrainingDataset::from_frame(frame).unwrap()
    }

    #[test]
    fn test_records_preserve_order_and_optionals() {
        let records = dataset().records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].crop, "小麦");
        assert_eq!(records[1].year, 2021);
        assert_eq!(records[0].yield_per_ha, Some(6.58));
        assert_eq!(records[1].yield_per_ha, None);
        assert_eq!(records[2].data_source.as_deref(), Some("统计年鉴"));
    }

    #[test]
    fn test_preview_limits_rows() {
        let preview = dataset().preview(2);
        assert_eq!(preview.rows.len(), 2);
        assert!(preview.columns.contains(&"crop".to_string()));
        assert_eq!(preview.rows[0]["crop"], serde_json::json!("小麦"));
    }

    #[test]
    fn test_summary() {
        let summary = dataset().summary().unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.year_min, Some(2020));
        assert_eq!(summary.year_max, Some(2022));
        assert_eq!(summary.crops.len(), 3);
    }

    #[test]
    fn test_records_report_missing_columns() {
        let frame = df!(
            "crop" => &["wheat"],
            "region" => &["north"],
            "year" => &["2020"],
        )
        .unwrap();
        let ds = TrainingDataset::from_frame(frame).unwrap();

        match ds.records() {
            Err(CropYieldError::SchemaError { missing }) => {
                assert_eq!(missing, vec!["sown_area_kha", "avg_price_yuan_per_ton", "yield_10kt"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
