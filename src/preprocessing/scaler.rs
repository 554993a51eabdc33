//! Standard scaling of numeric columns

use crate::error::{CropYieldError, Result};
use super::Transformer;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    scale: f64,
}

/// Standard scaler: (x - mean) / std.
///
/// Uses the population standard deviation; a constant column scales by 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a scaler over the given numeric columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learned (mean, scale) of a column
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.params.get(i))
            .map(|p| (p.mean, p.scale))
    }

    fn float_values(df: &DataFrame, column: &str) -> Result<Float64Chunked> {
        let series = df
            .column(column)
            .map_err(|_| CropYieldError::FeatureNotFound(column.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(series.f64()?.clone())
    }

    fn compute_params(values: &Float64Chunked) -> ScalerParams {
        let (count, sum) = values
            .into_iter()
            .flatten()
            .fold((0usize, 0.0f64), |(n, s), v| (n + 1, s + v));
        if count == 0 {
            return ScalerParams { mean: 0.0, scale: 1.0 };
        }

        let mean = sum / count as f64;
        let variance = values
            .into_iter()
            .flatten()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        let std = variance.sqrt();

        ScalerParams {
            mean,
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        }
    }
}

impl Transformer for StandardScaler {
    fn name(&self) -> &str {
        "standard_scaler"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.params = self
            .columns
            .iter()
            .map(|column| Self::float_values(df, column).map(|v| Self::compute_params(&v)))
            .collect::<Result<Vec<_>>>()?;
        self.is_fitted = true;
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(CropYieldError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.columns.len()));

        for (j, (column, params)) in self.columns.iter().zip(&self.params).enumerate() {
            let values = Self::float_values(df, column)?;
            for (i, value) in values.into_iter().enumerate() {
                let v = value.ok_or_else(|| {
                    CropYieldError::DataError(format!("null value in numeric column '{}'", column))
                })?;
                out[[i, j]] = (v - params.mean) / params.scale;
            }
        }

        Ok(out)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
