//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::CropYieldError;
use crate::inference::ValidationError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CropYieldError> for ServerError {
    fn from(err: CropYieldError) -> Self {
        match err {
            CropYieldError::Validation(e) => ServerError::Validation(e),
            CropYieldError::PredictionFailure(msg) => ServerError::Prediction(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Prediction(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::BadRequest(msg) => msg.clone(),
            ServerError::Validation(e) => e.to_string(),
            ServerError::NotFound(path) => format!("no route for {}", path),
            ServerError::Prediction(detail) => {
                tracing::error!(detail = %detail, "Prediction failed");
                "internal server error".to_string()
            }
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                "internal server error".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
