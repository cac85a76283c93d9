//! Presentation Formatting
//!
//! Rounding happens here only; [`Recommendation`] keeps full precision.

use crate::engine::Recommendation;
use serde::Serialize;
use std::fmt;

/// One quantity card as shown to the grower
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityLine {
    /// Machine key: `n`, `p`, `k` or `lime`
    pub key: &'static str,
    pub label: &'static str,
    /// Rounded value
    pub value: String,
    pub unit: &'static str,
}

/// Display form of a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationDisplay {
    pub action: String,
    /// N, P, K, then lime
    pub lines: Vec<QuantityLine>,
    /// Set when the model predicted a physically impossible amount
    pub has_negative_quantity: bool,
}

/// Lime is shown in kilograms with two decimals
pub fn format_lime_kg(value: f64) -> String {
    format!("{:.2}", value)
}

/// Nutrients are shown in grams with one decimal
pub fn format_nutrient_g(value: f64) -> String {
    format!("{:.1}", value)
}

impl RecommendationDisplay {
    pub fn new(recommendation: &Recommendation) -> Self {
        let q = &recommendation.quantities;
        let lines = vec![
            QuantityLine {
                key: "n",
                label: "ไนโตรเจน (N)",
                value: format_nutrient_g(q.n_g),
                unit: "กรัม",
            },
            QuantityLine {
                key: "p",
                label: "ฟอสฟอรัส (P)",
                value: format_nutrient_g(q.p_g),
                unit: "กรัม",
            },
            QuantityLine {
                key: "k",
                label: "โพแทสเซียม (K)",
                value: format_nutrient_g(q.k_g),
                unit: "กรัม",
            },
            QuantityLine {
                key: "lime",
                label: "ปูนขาว (Lime)",
                value: format_lime_kg(q.lime_kg),
                unit: "กิโลกรัม",
            },
        ];

        Self {
            action: recommendation.action.clone(),
            lines,
            has_negative_quantity: q.has_negative(),
        }
    }
}

impl From<&Recommendation> for RecommendationDisplay {
    fn from(recommendation: &Recommendation) -> Self {
        Self::new(recommendation)
    }
}

impl fmt::Display for RecommendationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.action)?;
        for line in &self.lines {
            writeln!(f, "  {}: {} {}", line.label, line.value, line.unit)?;
        }
        Ok(())
    }
}
