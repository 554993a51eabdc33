//! Single-request prediction against a trained model

use crate::error::{CropYieldError, Result};
use crate::training::TrainedModel;
use super::request::PredictionRequest;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `yield_10kt` is expressed in units of ten thousand tonnes
pub const TONNES_PER_10KT: f64 = 10_000.0;

/// Model output for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_yield_10kt: f64,
    pub predicted_yield_tonnes: f64,
    pub inputs: PredictionRequest,
}

/// Run a validated request through the fitted transformer and forest.
///
/// Read-only on the model; identical requests give bit-identical results. Any failure inside
/// the model is reported as `PredictionFailure`.
pub fn predict(model: &TrainedModel, request: &PredictionRequest) -> Result<PredictionResult> {
    if !request.sown_area_kha.is_finite() || !request.avg_price_yuan_per_ton.is_finite() {
        return Err(CropYieldError::PredictionFailure(
            "numeric inputs must be finite".to_string(),
        ));
    }

    let frame = request
        .to_frame()
        .map_err(|e| CropYieldError::PredictionFailure(format!("could not build input row: {}", e)))?;

    let predictions = model
        .predict_frame(&frame)
        .map_err(|e| CropYieldError::PredictionFailure(e.to_string()))?;

    let predicted_yield_10kt = predictions
        .first()
        .copied()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CropYieldError::PredictionFailure("model returned no usable value".to_string()))?;

    debug!(
        crop = %request.crop,
        region = %request.region,
        year = request.year,
        predicted_yield_10kt,
        "Prediction computed"
    );

    Ok(PredictionResult {
        predicted_yield_10kt,
        predicted_yield_tonnes: predicted_yield_10kt * TONNES_PER_10KT,
        inputs: request.clone(),
    })
}
