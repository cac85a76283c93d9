//! Data Validation
//!
//! Upstream checks that run before the recommendation pipeline: the grower's
//! target yield must be sensible, and the sensor reading is checked for
//! physically implausible or missing values.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
