//! Ordered composition of preprocessing stages

use crate::error::{CropYieldError, Result};
use super::Transformer;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use polars::prelude::DataFrame;
use std::time::Instant;
use tracing::debug;

/// Applies a list of stages to the same frame and concatenates their outputs column-wise.
#[derive(Debug, Default)]
pub struct ColumnTransformer {
    steps: Vec<Box<dyn Transformer>>,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in insertion order
    pub fn with_step(mut self, step: impl Transformer + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Transformer for ColumnTransformer {
    fn name(&self) -> &str {
        "column_transformer"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        for step in &mut self.steps {
            let start = Instant::now();
            step.fit(df)?;
            debug!(
                step = step.name(),
                n_features = step.feature_names_out().len(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "Fitted preprocessing step"
            );
        }
        self.is_fitted = true;
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(CropYieldError::ModelNotFitted);
        }

        let blocks = self
            .steps
            .iter()
            .map(|step| step.transform(df))
            .collect::<Result<Vec<_>>>()?;

        if blocks.is_empty() {
            return Ok(Array2::zeros((df.height(), 0)));
        }

        let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
        Ok(concatenate(Axis(1), &views)?)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.steps.iter().flat_map(|s| s.feature_names_out()).collect()
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
