//! Fertilizer Recommendation Engine
//!
//! Runs the action classifier and the quantity regressor over an assembled
//! feature vector. Predictors are injected at construction; ONNX-backed
//! implementations are loaded from a model bundle using tract-onnx.

mod display;
mod engine;
mod onnx;
mod pipeline;

pub use display::{QuantityLine, RecommendationDisplay};
pub use engine::{Classifier, Quantities, Recommendation, RecommendationEngine, Regressor};
pub use onnx::{ModelBundle, ModelManifest, OnnxClassifier, OnnxRegressor};
pub use pipeline::{Analysis, RecommendationPipeline};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Feature schema mismatch: expected v{expected}, model declares v{actual}")]
    SchemaMismatch { expected: u32, actual: u32 },
    #[error("Unmapped growth stage: {0:?}")]
    UnmappedStage(String),
}

impl From<FeatureError> for InferenceError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::UnmappedStage(stage) => InferenceError::UnmappedStage(stage),
        }
    }
}
