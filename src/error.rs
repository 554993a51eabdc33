//! Error types for the crop yield pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::inference::ValidationError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CropYieldError>;

/// Main error type for the crop yield pipeline
#[derive(Error, Debug)]
pub enum CropYieldError {
    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Dataset is missing required columns: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("Dataset has no usable rows after cleaning")]
    EmptyDataset,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Prediction failed: {0}")]
    PredictionFailure(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CropYieldError {
    /// Startup errors abort initialization; everything else is scoped to one request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CropYieldError::DatasetNotFound(_)
                | CropYieldError::SchemaError { .. }
                | CropYieldError::EmptyDataset
        )
    }
}

impl From<polars::error::PolarsError> for CropYieldError {
    fn from(err: polars::error::PolarsError) -> Self {
        CropYieldError::DataError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CropYieldError {
    fn from(err: ndarray::ShapeError) -> Self {
        CropYieldError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
