//! Growth Stage Encoding
//!
//! The integer codes below were used when the fertilizer models were trained.
//! Changing a code or adding a stage requires retraining and bumping
//! [`FEATURE_SCHEMA_VERSION`].

use crate::FeatureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of the feature contract (column order + stage codes)
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Phenological phase of the longan crop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthStage {
    /// Post-harvest tree recovery
    Recovery,
    /// Nutrient accumulation before flowering
    Accumulation,
    /// Fruit expansion
    FruitExpansion,
    /// Ripening, shortly before harvest
    PreHarvest,
}

/// One row of the stage table
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageEntry {
    pub stage: GrowthStage,
    /// Label shown in the stage selector
    pub name: &'static str,
    pub slug: &'static str,
    /// Model input code
    pub code: u8,
}

/// Closed stage table shared by every consumer of the stage codes
pub const STAGE_TABLE: [StageEntry; 4] = [
    StageEntry {
        stage: GrowthStage::Recovery,
        name: "ฟื้นต้น",
        slug: "recovery",
        code: 1,
    },
    StageEntry {
        stage: GrowthStage::Accumulation,
        name: "สะสมอาหาร",
        slug: "accumulation",
        code: 2,
    },
    StageEntry {
        stage: GrowthStage::FruitExpansion,
        name: "ขยายผล",
        slug: "fruit-expansion",
        code: 3,
    },
    StageEntry {
        stage: GrowthStage::PreHarvest,
        name: "ก่อนเก็บเกี่ยว",
        slug: "pre-harvest",
        code: 4,
    },
];

impl GrowthStage {
    /// All stages in code order
    pub fn all() -> impl Iterator<Item = GrowthStage> {
        STAGE_TABLE.iter().map(|e| e.stage)
    }

    /// Resolve a selector label or slug
    pub fn from_name(name: &str) -> Result<Self, FeatureError> {
        let name = name.trim();
        STAGE_TABLE
            .iter()
            .find(|e| e.name == name || e.slug == name)
            .map(|e| e.stage)
            .ok_or_else(|| FeatureError::UnmappedStage(name.to_string()))
    }

    fn entry(&self) -> &'static StageEntry {
        // Every variant has exactly one row; see `test_table_covers_every_variant`
        match self {
            GrowthStage::Recovery => &STAGE_TABLE[0],
            GrowthStage::Accumulation => &STAGE_TABLE[1],
            GrowthStage::FruitExpansion => &STAGE_TABLE[2],
            GrowthStage::PreHarvest => &STAGE_TABLE[3],
        }
    }

    /// Integer code fed to the models
    pub fn code(&self) -> u8 {
        self.entry().code
    }

    /// Selector label
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    pub fn slug(&self) -> &'static str {
        self.entry().slug
    }
}

impl FromStr for GrowthStage {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
