//! Feature Vector Assembly

use crate::snapshot::SensorSnapshot;
use crate::stage::{GrowthStage, FEATURE_SCHEMA_VERSION};
use crate::FeatureError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 7;

/// Column names in model order. Must match the training table exactly.
pub const FEATURE_COLUMNS: [&str; FEATURE_DIMENSION] = [
    "N_soil",
    "P_soil",
    "K_soil",
    "pH",
    "Moisture",
    "Stage",
    "Target_Yield_kg",
];

const IDX_N: usize = 0;
const IDX_P: usize = 1;
const IDX_K: usize = 2;
const IDX_PH: usize = 3;
const IDX_MOISTURE: usize = 4;
const IDX_STAGE: usize = 5;
const IDX_TARGET_YIELD: usize = 6;

/// Feature vector for ML inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// `[N, P, K, pH, Moisture, StageCode, TargetYield]`
    pub values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Row as `f32`, the input type of the exported models
    pub fn to_f32_row(&self) -> [f32; FEATURE_DIMENSION] {
        self.values.map(|v| v as f32)
    }

    pub fn nitrogen(&self) -> f64 {
        self.values[IDX_N]
    }

    pub fn phosphorus(&self) -> f64 {
        self.values[IDX_P]
    }

    pub fn potassium(&self) -> f64 {
        self.values[IDX_K]
    }

    pub fn ph(&self) -> f64 {
        self.values[IDX_PH]
    }

    pub fn moisture(&self) -> f64 {
        self.values[IDX_MOISTURE]
    }

    pub fn stage_code(&self) -> f64 {
        self.values[IDX_STAGE]
    }

    pub fn target_yield_kg(&self) -> f64 {
        self.values[IDX_TARGET_YIELD]
    }
}

/// Builds feature vectors from snapshots and grower input
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Create a new feature assembler
    pub fn new() -> Self {
        Self
    }

    /// Version of the column/stage contract this assembler produces
    pub fn schema_version(&self) -> u32 {
        FEATURE_SCHEMA_VERSION
    }

    /// Assemble from a stage selector label or slug.
    ///
    /// Fails with [`FeatureError::UnmappedStage`] for unknown stages. A target
    /// yield of zero or below is passed through; rejecting it is up to the caller.
    pub fn assemble(
        &self,
        snapshot: &SensorSnapshot,
        stage_name: &str,
        target_yield_kg: f64,
    ) -> Result<FeatureVector, FeatureError> {
        let stage = GrowthStage::from_name(stage_name)?;
        Ok(self.assemble_stage(snapshot, stage, target_yield_kg))
    }

    /// Assemble from an already resolved stage
    pub fn assemble_stage(
        &self,
        snapshot: &SensorSnapshot,
        stage: GrowthStage,
        target_yield_kg: f64,
    ) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[IDX_N] = snapshot.nitrogen();
        values[IDX_P] = snapshot.phosphorus();
        values[IDX_K] = snapshot.potassium();
        values[IDX_PH] = snapshot.ph();
        values[IDX_MOISTURE] = snapshot.moisture();
        values[IDX_STAGE] = f64::from(stage.code());
        values[IDX_TARGET_YIELD] = target_yield_kg;

        debug!(
            "Assembled features for stage {} (code {}): {:?}",
            stage.slug(),
            stage.code(),
            values
        );

        FeatureVector { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WIRE_KEYS: [&str; 5] = ["N", "P", "K", "pH", "Moist"];

    #[test]
    fn test_column_names() {
        assert_eq!(
            FEATURE_COLUMNS,
            ["N_soil", "P_soil", "K_soil", "pH", "Moisture", "Stage", "Target_Yield_kg"]
        );
    }

    #[test]
    fn test_assemble_reference_reading() {
        let snapshot = SensorSnapshot::new(12.0, 5.0, 8.0, 6.2, 45.0);
        let features = FeatureAssembler::new()
            .assemble(&snapshot, "ขยายผล", 100.0)
            .unwrap();

        assert_eq!(features.values, [12.0, 5.0, 8.0, 6.2, 45.0, 3.0, 100.0]);
        assert_eq!(features.stage_code(), 3.0);
        assert_eq!(features.target_yield_kg(), 100.0);
    }

    #[test]
    fn test_every_stage_code() {
        let assembler = FeatureAssembler::new();
        let snapshot = SensorSnapshot::default();
        for (name, code) in [("ฟื้นต้น", 1.0), ("สะสมอาหาร", 2.0), ("ขยายผล", 3.0), ("ก่อนเก็บเกี่ยว", 4.0)] {
            let features = assembler.assemble(&snapshot, name, 50.0).unwrap();
            assert_eq!(features.stage_code(), code);
        }
    }

    #[test]
    fn test_unmapped_stage() {
        let result = FeatureAssembler::new().assemble(&SensorSnapshot::default(), "harvest", 100.0);
        assert_eq!(result, Err(FeatureError::UnmappedStage("harvest".to_string())));
    }

    #[test]
    fn test_non_positive_target_yield_is_accepted() {
        let assembler = FeatureAssembler::new();
        let snapshot = SensorSnapshot::new(1.0, 1.0, 1.0, 7.0, 30.0);

        let zero = assembler.assemble(&snapshot, "recovery", 0.0).unwrap();
        assert_eq!(zero.target_yield_kg(), 0.0);

        let negative = assembler.assemble(&snapshot, "recovery", -25.0).unwrap();
        assert_eq!(negative.target_yield_kg(), -25.0);
    }

    #[test]
    fn test_f32_row() {
        let snapshot = SensorSnapshot::new(12.0, 5.0, 8.0, 6.5, 45.0);
        let row = FeatureAssembler::new()
            .assemble_stage(&snapshot, GrowthStage::Recovery, 80.0)
            .to_f32_row();
        assert_eq!(row, [12.0, 5.0, 8.0, 6.5, 45.0, 1.0, 80.0]);
    }

    proptest! {
        #[test]
        fn prop_missing_fields_become_zero(
            values in prop::array::uniform5((-4000i32..4000).prop_map(|v| f64::from(v) / 4.0)),
            present in prop::array::uniform5(any::<bool>()),
            stage in 0usize..4,
        ) {
            let body: Vec<String> = WIRE_KEYS
                .iter()
                .zip(values.iter())
                .zip(present.iter())
                .filter(|(_, keep)| **keep)
                .map(|((key, value), _)| format!("\"{}\": {}", key, value))
                .collect();
            let json = format!("{{{}}}", body.join(", "));
            let snapshot: SensorSnapshot = serde_json::from_str(&json).unwrap();

            let stage = crate::STAGE_TABLE[stage].stage;
            let features = FeatureAssembler::new().assemble_stage(&snapshot, stage, 100.0);

            for i in 0..5 {
                let expected = if present[i] { values[i] } else { 0.0 };
                prop_assert_eq!(features.values[i], expected);
            }
            prop_assert_eq!(features.stage_code(), f64::from(stage.code()));
        }

        #[test]
        fn prop_column_order_ignores_key_order(
            values in prop::array::uniform5((0i32..2000).prop_map(|v| f64::from(v) / 4.0)),
            order in Just(vec![0usize, 1, 2, 3, 4]).prop_shuffle(),
            target in 1.0f64..400.0,
        ) {
            let body: Vec<String> = order
                .iter()
                .map(|&i| format!("\"{}\": {}", WIRE_KEYS[i], values[i]))
                .collect();
            let json = format!("{{{}}}", body.join(", "));
            let snapshot: SensorSnapshot = serde_json::from_str(&json).unwrap();

            let assembler = FeatureAssembler::new();
            let first = assembler.assemble(&snapshot, "สะสมอาหาร", target).unwrap();
            let second = assembler.assemble(&snapshot, "สะสมอาหาร", target).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(
                first.values,
                [values[0], values[1], values[2], values[3], values[4], 2.0, target]
            );
        }
    }
}
