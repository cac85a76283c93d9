//! Recommendation Engine Implementation

use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Predicts the advisory action label for each feature row
pub trait Classifier: Send + Sync {
    /// Feature schema version the model was trained against
    fn schema_version(&self) -> u32;

    /// One label per input row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<String>, InferenceError>;
}

/// Predicts `[lime_kg, n_g, p_g, k_g]` for each feature row
pub trait Regressor: Send + Sync {
    /// Feature schema version the model was trained against
    fn schema_version(&self) -> u32;

    /// One quantity tuple per input row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<[f64; 4]>, InferenceError>;
}

/// Amendment quantities, full precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantities {
    /// Agricultural lime (kg)
    pub lime_kg: f64,
    /// Nitrogen (g)
    pub n_g: f64,
    /// Phosphorus (g)
    pub p_g: f64,
    /// Potassium (g)
    pub k_g: f64,
}

impl Quantities {
    /// Build from regressor output order `[lime, N, P, K]`
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            lime_kg: values[0],
            n_g: values[1],
            p_g: values[2],
            k_g: values[3],
        }
    }

    /// `[lime, N, P, K]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.lime_kg, self.n_g, self.p_g, self.k_g]
    }

    pub fn has_negative(&self) -> bool {
        self.as_array().iter().any(|q| *q < 0.0)
    }
}

/// Fertilizer recommendation for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Advisory label, exactly as returned by the classifier
    pub action: String,
    /// Amounts to apply, unclamped
    pub quantities: Quantities,
}

/// Runs the classifier/regressor pair over a feature vector
pub struct RecommendationEngine {
    classifier: Box<dyn Classifier>,
    regressor: Box<dyn Regressor>,
}

impl RecommendationEngine {
    /// Create an engine, refusing models built for another feature schema
    pub fn new(
        classifier: Box<dyn Classifier>,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self, InferenceError> {
        for actual in [classifier.schema_version(), regressor.schema_version()] {
            if actual != FEATURE_SCHEMA_VERSION {
                return Err(InferenceError::SchemaMismatch {
                    expected: FEATURE_SCHEMA_VERSION,
                    actual,
                });
            }
        }

        info!(
            "Creating recommendation engine (feature schema v{})",
            FEATURE_SCHEMA_VERSION
        );
        Ok(Self {
            classifier,
            regressor,
        })
    }

    /// Run both predictors once on the given features.
    ///
    /// Either both outputs are returned or the call fails with
    /// [`InferenceError::PredictionFailed`].
    pub fn recommend(&self, features: &FeatureVector) -> Result<Recommendation, InferenceError> {
        let rows = std::slice::from_ref(features);

        let labels = self
            .classifier
            .predict(rows)
            .map_err(|e| prediction_failed("classifier", e))?;
        let action = single_row("classifier", labels)?;

        let outputs = self
            .regressor
            .predict(rows)
            .map_err(|e| prediction_failed("regressor", e))?;
        let quantities = Quantities::from_array(single_row("regressor", outputs)?);

        if quantities.has_negative() {
            warn!(
                "Regressor returned negative quantities {:?} for features {:?}",
                quantities.as_array(),
                features.values
            );
        }

        debug!("Recommendation: {} {:?}", action, quantities.as_array());

        Ok(Recommendation { action, quantities })
    }
}

fn prediction_failed(model: &str, err: InferenceError) -> InferenceError {
    match err {
        InferenceError::PredictionFailed(msg) => {
            InferenceError::PredictionFailed(format!("{}: {}", model, msg))
        }
        other => InferenceError::PredictionFailed(format!("{}: {}", model, other)),
    }
}

fn single_row<T>(model: &str, outputs: Vec<T>) -> Result<T, InferenceError> {
    let count = outputs.len();
    let mut outputs = outputs.into_iter();
    match (outputs.next(), count) {
        (Some(output), 1) => Ok(output),
        _ => Err(InferenceError::PredictionFailed(format!(
            "{} returned {} rows for 1 input row",
            model, count
        ))),
    }
}
