//! API route definitions

use std::sync::Arc;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::AppState, ServerError};

async fn handle_404(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "error": "method not allowed",
        })),
    )
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .route("/model/preview", get(handlers::model_preview))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
