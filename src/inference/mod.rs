//! Inference module
//!
//! Turns untyped request payloads into validated [`PredictionRequest`]s and runs them
//! through a [`TrainedModel`](crate::training::TrainedModel).

mod engine;
mod request;

pub use engine::{predict, PredictionResult, TONNES_PER_10KT};
pub use request::{validate_input, PredictionRequest, ValidationError, REQUIRED_FIELDS};
