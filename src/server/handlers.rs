//! HTTP request handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::inference::{predict as run_prediction, validate_input};

use super::error::{Result, ServerError};
use super::state::AppState;

const DEFAULT_PREVIEW_ROWS: usize = 5;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "records": state.dataset.len(),
        "dataset": state.dataset.file_name(),
    }))
}

/// Predict the yield for one JSON object.
///
/// The body is parsed by hand so malformed JSON gets the same error envelope as every other
/// rejection.
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Value>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ServerError::BadRequest("request body must be valid JSON".to_string()))?;

    let request = validate_input(&payload)?;
    debug!(crop = %request.crop, region = %request.region, year = request.year, "Validated prediction request");

    let model = Arc::clone(&state.model);
    let result = tokio::task::spawn_blocking(move || run_prediction(&model, &request))
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))??;

    Ok(Json(json!({
        "success": true,
        "data": result,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    limit: Option<String>,
}

impl PreviewQuery {
    /// Unparsable limits fall back to the default; anything below 1 is raised to 1.
    fn rows(&self) -> usize {
        match self.limit.as_deref().map(|s| s.trim().parse::<i64>()) {
            Some(Ok(n)) => n.max(1) as usize,
            _ => DEFAULT_PREVIEW_ROWS,
        }
    }
}

pub async fn model_preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Json<Value> {
    let preview = state.dataset.preview(query.rows());
    Json(json!({
        "columns": preview.columns,
        "rows": preview.rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>) -> PreviewQuery {
        PreviewQuery { limit: limit.map(String::from) }
    }

    #[test]
    fn test_preview_limit_parsing() {
        assert_eq!(query(None).rows(), 5);
        assert_eq!(query(Some("3")).rows(), 3);
        assert_eq!(query(Some("0")).rows(), 1);
        assert_eq!(query(Some("-4")).rows(), 1);
        assert_eq!(query(Some("many")).rows(), 5);
    }
}
