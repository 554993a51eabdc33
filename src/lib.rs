//! cropyield - crop yield prediction from historical production data
//!
//! Loads a historical yield table, fits a one-hot + standardization + random forest
//! pipeline on it once, and answers per-request yield predictions.
//!
//! # Modules
//!
//! ## Core
//! - [`dataset`] - Loading and cleaning the training table
//! - [`preprocessing`] - One-hot encoding, standard scaling and their composition
//! - [`training`] - Regression trees, random forest and `train_model`
//! - [`inference`] - Request validation and prediction
//!
//! ## Services
//! - [`server`] - HTTP server
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod dataset;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{CropYieldError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CropYieldError, Result};

    // Dataset
    pub use crate::dataset::{load_dataset, CleanedRecord, DatasetPreview, DatasetSummary, TrainingDataset};

    // Preprocessing
    pub use crate::preprocessing::{ColumnTransformer, OneHotEncoder, StandardScaler, Transformer};

    // Training
    pub use crate::training::{build_model, train_model, ModelConfig, MaxFeatures, RandomForest, TrainedModel, YieldPipeline};

    // Inference
    pub use crate::inference::{predict, validate_input, PredictionRequest, PredictionResult, ValidationError};

    // Server
    pub use crate::server::{create_router, AppState, ServerConfig};
}
