//! Application state management

use std::sync::Arc;

use crate::dataset::{load_dataset, TrainingDataset};
use crate::error::Result;
use crate::training::{train_model, TrainedModel};

use super::ServerConfig;

/// Read-only state shared across handlers
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub dataset: Arc<TrainingDataset>,
    pub model: Arc<TrainedModel>,
}

impl AppState {
    pub fn new(config: ServerConfig, dataset: TrainingDataset, model: TrainedModel) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
            model: Arc::new(model),
        }
    }

    /// Load the configured dataset and train the model on it. Blocking.
    pub fn initialize(config: ServerConfig) -> Result<Self> {
        let dataset = load_dataset(&config.dataset_path)?;
        let model = train_model(&dataset, &config.model)?;
        Ok(Self::new(config, dataset, model))
    }
}
