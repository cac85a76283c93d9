//! Range Checking for Readings and Requests

use crate::error::ValidationError;
use feature_engine::SensorSnapshot;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Lowest accepted nutrient reading (g)
    pub nutrient_min: f64,
    /// Soil pH valid range
    pub ph_range: (f64, f64),
    /// Soil moisture valid range (%)
    pub moisture_range: (f64, f64),
    /// Lowest accepted target yield (kg per tree)
    pub target_yield_min: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            nutrient_min: 0.0,
            ph_range: (0.0, 14.0),
            moisture_range: (0.0, 100.0),
            target_yield_min: 1.0,
        }
    }
}

/// Outcome of a snapshot check
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// True when no problem was found
    pub valid: bool,
    /// Problems found, missing fields first
    pub errors: Vec<ValidationError>,
    /// Number of snapshot fields checked
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a result from collected errors
    pub fn from_errors(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }
}

/// Validator for sensor snapshots and analysis requests
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    fn validate_min(&self, field: &'static str, value: f64, min: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < min {
            Err(ValidationError::BelowMinimum { field, value, min })
        } else {
            Ok(())
        }
    }

    /// Validate a nutrient reading (N, P or K)
    pub fn validate_nutrient(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        self.validate_min(field, value, self.config.nutrient_min)
    }

    /// Validate soil pH
    pub fn validate_ph(&self, ph: f64) -> Result<(), ValidationError> {
        self.validate_range("pH", ph, self.config.ph_range)
    }

    /// Validate soil moisture
    pub fn validate_moisture(&self, moisture: f64) -> Result<(), ValidationError> {
        self.validate_range("Moist", moisture, self.config.moisture_range)
    }

    /// Validate the grower's target yield
    pub fn validate_target_yield(&self, target_yield_kg: f64) -> Result<(), ValidationError> {
        self.validate_min("target_yield_kg", target_yield_kg, self.config.target_yield_min)
    }

    /// Check every snapshot field, collecting all problems.
    ///
    /// Absent fields are reported as [`ValidationError::MissingField`]; the
    /// assembler will still read them as zero.
    pub fn validate_snapshot(&self, snapshot: &SensorSnapshot) -> ValidationResult {
        let mut errors: Vec<ValidationError> = snapshot
            .missing_fields()
            .into_iter()
            .map(|field| ValidationError::MissingField { field })
            .collect();

        let checks = [
            snapshot.n.map(|v| self.validate_nutrient("N", v)),
            snapshot.p.map(|v| self.validate_nutrient("P", v)),
            snapshot.k.map(|v| self.validate_nutrient("K", v)),
            snapshot.ph.map(|v| self.validate_ph(v)),
            snapshot.moist.map(|v| self.validate_moisture(v)),
        ];
        let fields_checked = checks.len();
        errors.extend(checks.into_iter().flatten().filter_map(Result::err));

        for error in &errors {
            warn!("Sensor snapshot: {}", error);
        }

        ValidationResult::from_errors(errors, fields_checked)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_ph() {
        let validator = Validator::default();
        assert!(validator.validate_ph(0.0).is_ok());
        assert!(validator.validate_ph(6.2).is_ok());
        assert!(validator.validate_ph(14.0).is_ok());
    }

    #[test]
    fn test_invalid_ph() {
        let validator = Validator::default();
        assert!(validator.validate_ph(-0.1).is_err());
        assert!(validator.validate_ph(15.0).is_err());
        assert_eq!(
            validator.validate_ph(f64::NAN),
            Err(ValidationError::NotFinite { field: "pH" })
        );
    }

    #[test]
    fn test_moisture_range() {
        let validator = Validator::default();
        assert!(validator.validate_moisture(45.0).is_ok());
        assert!(validator.validate_moisture(100.0).is_ok());
        assert!(validator.validate_moisture(120.0).is_err());
    }

    #[test]
    fn test_target_yield() {
        let validator = Validator::default();
        assert!(validator.validate_target_yield(1.0).is_ok());
        assert!(validator.validate_target_yield(100.0).is_ok());
        assert_eq!(
            validator.validate_target_yield(0.0),
            Err(ValidationError::BelowMinimum {
                field: "target_yield_kg",
                value: 0.0,
                min: 1.0
            })
        );
        assert!(validator.validate_target_yield(-5.0).is_err());
        assert!(validator.validate_target_yield(f64::INFINITY).is_err());
    }

    #[test]
    fn test_complete_snapshot_is_valid() {
        let validator = Validator::default();
        let result = validator.validate_snapshot(&SensorSnapshot::new(12.0, 5.0, 8.0, 6.2, 45.0));
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.fields_checked, 5);
    }

    #[test]
    fn test_snapshot_problems_are_collected() {
        let validator = Validator::default();
        let snapshot = SensorSnapshot {
            n: Some(-3.0),
            ph: Some(19.0),
            moist: Some(40.0),
            ..Default::default()
        };

        let result = validator.validate_snapshot(&snapshot);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors.contains(&ValidationError::MissingField { field: "P" }));
        assert!(result.errors.contains(&ValidationError::MissingField { field: "K" }));
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::BelowMinimum { field: "N", .. })));
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::OutOfRange { field: "pH", .. })));
    }

    proptest! {
        #[test]
        fn prop_plausible_readings_pass(
            n in 0.0f64..500.0,
            p in 0.0f64..500.0,
            k in 0.0f64..500.0,
            ph in 0.0f64..=14.0,
            moist in 0.0f64..=100.0,
        ) {
            let result = Validator::default().validate_snapshot(&SensorSnapshot::new(n, p, k, ph, moist));
            prop_assert!(result.valid);
        }
    }
}
