//! Shared threshold validation helpers.
//!
//! Used when loading alert thresholds from configuration.

use crate::error::CoreError;

/// Validate that a threshold is a finite number.
pub fn validate_finite(value: f32, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a threshold is finite and not negative.
///
/// RMS current can never be negative, so a negative current threshold
/// would make every reading alert.
pub fn validate_non_negative(value: f32, name: &str) -> Result<(), CoreError> {
    validate_finite(value, name)?;
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}
