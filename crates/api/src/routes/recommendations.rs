//! Recommendation Routes

use axum::{extract::State, Json};
use data_validator::ValidationError;
use feature_engine::FeatureVector;
use inference_engine::{Recommendation, RecommendationDisplay};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::SnapshotDocument;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Grower input for one analysis
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Stage selector label or slug
    pub stage: String,
    /// Target yield (kg per tree)
    pub target_yield_kg: f64,
}

/// Response for recommendations endpoint
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub analysis_id: Uuid,
    pub snapshot: SnapshotDocument,
    /// Plausibility problems in the snapshot; they do not block the analysis
    pub warnings: Vec<ValidationError>,
    pub features: FeatureVector,
    /// Full-precision model output
    pub recommendation: Recommendation,
    /// Rounded form for display
    pub display: RecommendationDisplay,
    pub latency_ms: u64,
}

/// Run an analysis on the latest snapshot
pub async fn create_recommendation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let analysis_id = Uuid::new_v4();
    info!(
        "Analysis {}: stage={:?} target_yield_kg={}",
        analysis_id, request.stage, request.target_yield_kg
    );

    state.validator.validate_target_yield(request.target_yield_kg)?;

    let snapshot = state
        .store
        .fetch_latest()
        .await?
        .ok_or(ApiError::MissingData)?;
    let warnings = state.validator.validate_snapshot(&snapshot.snapshot).errors;

    let analysis = state
        .pipeline
        .analyze(&snapshot.snapshot, &request.stage, request.target_yield_kg)
        .map_err(|e| {
            counter!("terra_analysis_failures_total").increment(1);
            e
        })?;

    counter!("terra_analyses_total").increment(1);
    histogram!("terra_inference_latency_ms").record(analysis.latency_ms as f64);

    info!(
        "Analysis {}: action={:?} quantities={:?}",
        analysis_id,
        analysis.recommendation.action,
        analysis.recommendation.quantities.as_array()
    );

    Ok(Json(RecommendationResponse {
        analysis_id,
        snapshot,
        warnings,
        features: analysis.features,
        display: RecommendationDisplay::new(&analysis.recommendation),
        recommendation: analysis.recommendation,
        latency_ms: analysis.latency_ms,
    }))
}
