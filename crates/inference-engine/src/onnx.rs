//! ONNX Model Bundle
//!
//! The trained classifier and regressor are exported to ONNX and described by
//! a JSON manifest:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "feature_columns": ["N_soil", "P_soil", "K_soil", "pH", "Moisture", "Stage", "Target_Yield_kg"],
//!   "classifier": "classifier.onnx",
//!   "regressor": "regressor.onnx",
//!   "class_labels": ["เพิ่มไนโตรเจน", "เพิ่มโพแทสเซียม"]
//! }
//! ```
//!
//! Model paths are resolved relative to the manifest. `class_labels` is only
//! needed when the classifier emits integer class indices instead of strings.

use crate::engine::{Classifier, RecommendationEngine, Regressor};
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_COLUMNS, FEATURE_DIMENSION, FEATURE_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;
use tracing::{debug, info};

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Number of regressor outputs per row: lime, N, P, K
const REGRESSOR_OUTPUTS: usize = 4;

/// Bundle manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Feature schema the models were trained against
    pub schema_version: u32,
    /// Training column order
    pub feature_columns: Vec<String>,
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    #[serde(default)]
    pub class_labels: Vec<String>,
}

impl ModelManifest {
    pub fn from_json(text: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(text)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid manifest: {}", e)))
    }

    /// Check the declared feature contract against the assembler's
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(InferenceError::SchemaMismatch {
                expected: FEATURE_SCHEMA_VERSION,
                actual: self.schema_version,
            });
        }

        if self.feature_columns.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{:?}", FEATURE_COLUMNS),
                actual: format!("{:?}", self.feature_columns),
            });
        }

        Ok(())
    }
}

/// Classifier and regressor loaded from one manifest
pub struct ModelBundle {
    pub classifier: OnnxClassifier,
    pub regressor: OnnxRegressor,
}

impl ModelBundle {
    /// Load and validate a bundle from its manifest path
    pub fn load(manifest_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let manifest_path = manifest_path.as_ref();
        info!("Loading model bundle: {}", manifest_path.display());

        let text = std::fs::read_to_string(manifest_path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", manifest_path.display(), e))
        })?;
        let manifest = ModelManifest::from_json(&text)?;
        manifest.validate()?;

        let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let classifier = OnnxClassifier::load(
            &base.join(&manifest.classifier),
            manifest.class_labels.clone(),
            manifest.schema_version,
        )?;
        let regressor = OnnxRegressor::load(&base.join(&manifest.regressor), manifest.schema_version)?;

        info!("Model bundle loaded (schema v{})", manifest.schema_version);
        Ok(Self {
            classifier,
            regressor,
        })
    }

    /// Wire both models into an engine
    pub fn into_engine(self) -> Result<RecommendationEngine, InferenceError> {
        RecommendationEngine::new(Box::new(self.classifier), Box::new(self.regressor))
    }
}

/// Action classifier backed by an ONNX graph
pub struct OnnxClassifier {
    plan: OnnxPlan,
    class_labels: Vec<String>,
    schema_version: u32,
}

impl OnnxClassifier {
    pub fn load(
        path: &Path,
        class_labels: Vec<String>,
        schema_version: u32,
    ) -> Result<Self, InferenceError> {
        Ok(Self {
            plan: load_plan(path)?,
            class_labels,
            schema_version,
        })
    }

    fn decode(&self, output: &Tensor) -> Result<String, InferenceError> {
        match output.datum_type() {
            DatumType::String => output
                .as_slice::<String>()
                .map_err(failed)?
                .first()
                .cloned()
                .ok_or_else(|| failed("empty label tensor")),
            DatumType::I64 => {
                let index = output
                    .as_slice::<i64>()
                    .map_err(failed)?
                    .first()
                    .copied()
                    .ok_or_else(|| failed("empty label tensor"))?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| self.class_labels.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        failed(format!(
                            "class index {} outside {} known labels",
                            index,
                            self.class_labels.len()
                        ))
                    })
            }
            other => Err(failed(format!("unsupported label type {:?}", other))),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<String>, InferenceError> {
        rows.iter()
            .map(|row| {
                let outputs = run_row(&self.plan, row)?;
                let label = outputs.first().ok_or_else(|| failed("classifier produced no outputs"))?;
                self.decode(label)
            })
            .collect()
    }
}

/// Quantity regressor backed by an ONNX graph
pub struct OnnxRegressor {
    plan: OnnxPlan,
    schema_version: u32,
}

impl OnnxRegressor {
    pub fn load(path: &Path, schema_version: u32) -> Result<Self, InferenceError> {
        Ok(Self {
            plan: load_plan(path)?,
            schema_version,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<[f64; 4]>, InferenceError> {
        rows.iter()
            .map(|row| {
                let outputs = run_row(&self.plan, row)?;
                let output = outputs.first().ok_or_else(|| failed("regressor produced no outputs"))?;
                let values: Vec<f64> = match output.datum_type() {
                    DatumType::F32 => output
                        .as_slice::<f32>()
                        .map_err(failed)?
                        .iter()
                        .map(|v| f64::from(*v))
                        .collect(),
                    DatumType::F64 => output.as_slice::<f64>().map_err(failed)?.to_vec(),
                    other => return Err(failed(format!("unsupported output type {:?}", other))),
                };
                <[f64; REGRESSOR_OUTPUTS]>::try_from(values.as_slice()).map_err(|_| {
                    InferenceError::InvalidInputShape {
                        expected: format!("[1, {}]", REGRESSOR_OUTPUTS),
                        actual: format!("{:?}", output.shape()),
                    }
                })
            })
            .collect()
    }
}

fn failed(err: impl Display) -> InferenceError {
    InferenceError::PredictionFailed(err.to_string())
}

fn load_plan(path: &Path) -> Result<OnnxPlan, InferenceError> {
    debug!("Loading ONNX model: {}", path.display());
    tract_onnx::onnx()
        .model_for_path(path)
        .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into()))
        .and_then(|model| model.into_optimized())
        .and_then(|model| model.into_runnable())
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}

fn run_row(plan: &OnnxPlan, row: &FeatureVector) -> Result<TVec<TValue>, InferenceError> {
    let data = row.to_f32_row();
    let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &data[..]).map_err(failed)?;
    plan.run(tvec!(input.into())).map_err(failed)
}
