//! Feature Engineering Engine
//!
//! Turns a soil-sensor snapshot plus grower context (growth stage, target
//! yield) into the fixed-order feature vector consumed by the fertilizer
//! models.

mod features;
mod snapshot;
mod stage;

pub use features::{FeatureAssembler, FeatureVector, FEATURE_COLUMNS, FEATURE_DIMENSION};
pub use snapshot::SensorSnapshot;
pub use stage::{GrowthStage, StageEntry, FEATURE_SCHEMA_VERSION, STAGE_TABLE};

use thiserror::Error;

/// Errors during feature assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Unmapped growth stage: {0:?}")]
    UnmappedStage(String),
}
