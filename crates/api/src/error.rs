//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use inference_engine::InferenceError;
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Nothing has been published by the sensor node yet
    #[error("No sensor data found in the cloud store; check the field device and retry")]
    MissingData,
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Snapshot store unavailable: {0}")]
    Storage(#[from] StorageError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    /// Whether re-triggering the same request may succeed
    pub retry: bool,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str, bool) {
        match self {
            ApiError::MissingData => (StatusCode::NOT_FOUND, "missing_data", true),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", false),
            ApiError::Inference(InferenceError::UnmappedStage(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unmapped_stage", false)
            }
            ApiError::Inference(_) => (StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed", true),
            ApiError::Storage(_) => (StatusCode::BAD_GATEWAY, "store_unavailable", true),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, retry) = self.status_and_code();
        if status.is_server_error() {
            error!("{}: {}", code, self);
        } else {
            warn!("{}: {}", code, self);
        }

        let body = ErrorBody {
            error: code,
            message: self.to_string(),
            retry,
        };
        (status, Json(body)).into_response()
    }
}
