//! Soil Sensor Snapshot

use serde::{Deserialize, Serialize};

/// Latest reading published by the field sensor node.
///
/// Every field is optional on the wire (lower-case keys are accepted too).
/// Accessors read an absent field as `0.0`; the `Option` is kept so
/// validation can report what was missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Nitrogen (g)
    #[serde(rename = "N", alias = "n", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    /// Phosphorus (g)
    #[serde(rename = "P", alias = "p", default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    /// Potassium (g)
    #[serde(rename = "K", alias = "k", default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    /// Soil pH
    #[serde(rename = "pH", alias = "ph", default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    /// Soil moisture (%)
    #[serde(rename = "Moist", alias = "moist", default, skip_serializing_if = "Option::is_none")]
    pub moist: Option<f64>,
}

impl SensorSnapshot {
    /// Snapshot with every field present
    pub fn new(n: f64, p: f64, k: f64, ph: f64, moist: f64) -> Self {
        Self {
            n: Some(n),
            p: Some(p),
            k: Some(k),
            ph: Some(ph),
            moist: Some(moist),
        }
    }

    pub fn nitrogen(&self) -> f64 {
        self.n.unwrap_or(0.0)
    }

    pub fn phosphorus(&self) -> f64 {
        self.p.unwrap_or(0.0)
    }

    pub fn potassium(&self) -> f64 {
        self.k.unwrap_or(0.0)
    }

    pub fn ph(&self) -> f64 {
        self.ph.unwrap_or(0.0)
    }

    pub fn moisture(&self) -> f64 {
        self.moist.unwrap_or(0.0)
    }

    /// Wire names of the fields that were absent
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("N", self.n),
            ("P", self.p),
            ("K", self.k),
            ("pH", self.ph),
            ("Moist", self.moist),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}
