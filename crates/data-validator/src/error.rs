//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// Implausible or missing input
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value below the allowed minimum
    #[error("{field} value {value} is below the minimum of {min}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },

    /// Value is NaN or infinite
    #[error("{field} value is not a finite number")]
    NotFinite { field: &'static str },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}
