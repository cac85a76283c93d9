//! Sensor-to-Recommendation Pipeline

use crate::engine::{Recommendation, RecommendationEngine};
use crate::InferenceError;
use feature_engine::{FeatureAssembler, FeatureVector, SensorSnapshot};
use serde::Serialize;
use tracing::debug;

/// Result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Features the models were run on
    pub features: FeatureVector,
    pub recommendation: Recommendation,
    /// Time spent in both predictors
    pub latency_ms: u64,
}

/// Assembler and engine wired together
pub struct RecommendationPipeline {
    assembler: FeatureAssembler,
    engine: RecommendationEngine,
}

impl RecommendationPipeline {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            assembler: FeatureAssembler::new(),
            engine,
        }
    }

    /// Assemble features and run a single inference attempt.
    ///
    /// An unknown stage is rejected before either predictor runs.
    pub fn analyze(
        &self,
        snapshot: &SensorSnapshot,
        stage_name: &str,
        target_yield_kg: f64,
    ) -> Result<Analysis, InferenceError> {
        let features = self
            .assembler
            .assemble(snapshot, stage_name, target_yield_kg)?;

        let start = std::time::Instant::now();
        let recommendation = self.engine.recommend(&features)?;
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!("Inference completed in {}ms", latency_ms);

        Ok(Analysis {
            features,
            recommendation,
            latency_ms,
        })
    }
}
