//! Sensor Routes

use axum::{extract::State, Json};
use data_validator::ValidationResult;
use serde::Serialize;
use std::sync::Arc;
use storage::SnapshotDocument;

use crate::{ApiError, AppState};

/// Response for the latest-snapshot endpoint
#[derive(Debug, Serialize)]
pub struct SensorResponse {
    pub data: SnapshotDocument,
    pub validation: ValidationResult,
}

/// Get the latest sensor snapshot
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SensorResponse>, ApiError> {
    let document = state
        .store
        .fetch_latest()
        .await?
        .ok_or(ApiError::MissingData)?;
    let validation = state.validator.validate_snapshot(&document.snapshot);

    Ok(Json(SensorResponse {
        data: document,
        validation,
    }))
}
