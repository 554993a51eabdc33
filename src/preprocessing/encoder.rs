//! One-hot encoding of categorical columns

use crate::error::{CropYieldError, Result};
use super::Transformer;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vocabulary learned for one column, sorted so the output layout is stable
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnVocabulary {
    column: String,
    categories: Vec<String>,
}

impl ColumnVocabulary {
    fn position(&self, value: &str) -> Option<usize> {
        self.categories.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }
}

/// One-hot encoder.
///
/// Every known category gets one indicator column. Categories never seen during fit, and
/// null values, encode as an all-zero block instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    vocabularies: Vec<ColumnVocabulary>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create an encoder over the given categorical columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    /// Known categories of a column, sorted
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|v| v.column == column)
            .map(|v| v.categories.as_slice())
    }

    /// Total number of indicator columns produced
    pub fn n_features_out(&self) -> usize {
        self.vocabularies.iter().map(|v| v.categories.len()).sum()
    }

    fn string_values(df: &DataFrame, column: &str) -> Result<StringChunked> {
        let series = df
            .column(column)
            .map_err(|_| CropYieldError::FeatureNotFound(column.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        Ok(series.str()?.clone())
    }
}

impl Transformer for OneHotEncoder {
    fn name(&self) -> &str {
        "one_hot"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut vocabularies = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let values = Self::string_values(df, column)?;
            let categories: BTreeSet<&str> = values.into_iter().flatten().collect();
            vocabularies.push(ColumnVocabulary {
                column: column.clone(),
                categories: categories.into_iter().map(String::from).collect(),
            });
        }

        self.vocabularies = vocabularies;
        self.is_fitted = true;
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(CropYieldError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.n_features_out()));
        let mut offset = 0;

        for vocabulary in &self.vocabularies {
            let values = Self::string_values(df, &vocabulary.column)?;
            for (row, value) in values.into_iter().enumerate() {
                if let Some(pos) = value.and_then(|v| vocabulary.position(v)) {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += vocabulary.categories.len();
        }

        Ok(out)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| v.categories.iter().map(move |c| format!("{}_{}", v.column, c)))
            .collect()
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
