//! Growth Stage Routes

use axum::Json;
use feature_engine::{StageEntry, FEATURE_SCHEMA_VERSION, STAGE_TABLE};
use serde::Serialize;

/// Response for stages endpoint
#[derive(Debug, Serialize)]
pub struct StagesResponse {
    pub schema_version: u32,
    pub data: Vec<StageEntry>,
}

/// List the selectable growth stages and their model codes
pub async fn get_stages() -> Json<StagesResponse> {
    Json(StagesResponse {
        schema_version: FEATURE_SCHEMA_VERSION,
        data: STAGE_TABLE.to_vec(),
    })
}
