//! Feature preprocessing
//!
//! Provides the transformation stages applied before regression:
//! - One-hot encoding of categorical columns, tolerant of unseen categories
//! - Standard scaling (z-score) of numeric columns
//! - Ordered composition of stages into one feature matrix

mod encoder;
mod scaler;
mod pipeline;

pub use encoder::OneHotEncoder;
pub use scaler::StandardScaler;
pub use pipeline::ColumnTransformer;

use crate::error::Result;
use ndarray::Array2;
use polars::prelude::DataFrame;

/// Common fit/apply contract shared by every preprocessing stage.
///
/// A stage reads the columns it was configured with from the frame and emits a dense block
/// of features; blocks from consecutive stages are concatenated left to right.
pub trait Transformer: std::fmt::Debug + Send + Sync {
    /// Stage name used in logs
    fn name(&self) -> &str;

    /// Learn parameters from the training frame.
    fn fit(&mut self, df: &DataFrame) -> Result<()>;

    /// Apply the learned parameters. Fails with `ModelNotFitted` before `fit`.
    fn transform(&self, df: &DataFrame) -> Result<Array2<f64>>;

    /// Names of the emitted feature columns, in output order.
    fn feature_names_out(&self) -> Vec<String>;

    fn is_fitted(&self) -> bool;

    /// Fit and transform in one step
    fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }
}
