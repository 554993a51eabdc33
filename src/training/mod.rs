//! Model training module
//!
//! Provides the yield regressor and its training entry points:
//! - Regression trees (squared-error splits)
//! - Random forest with seeded bootstrap sampling
//! - Pipeline assembly (`build_model`) and fitting (`train_model`)

mod config;
mod engine;
pub mod decision_tree;
pub mod random_forest;

pub use config::{MaxFeatures, ModelConfig, DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE};
pub use engine::{build_model, train_model, TrainedModel, YieldPipeline};
pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::RandomForest;
