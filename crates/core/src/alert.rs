//! Threshold-crossing alert events.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of a sensor name carried by an alert.
pub const MAX_SENSOR_NAME_CHARS: usize = 20;

/// Maximum length of a unit label carried by an alert.
pub const MAX_UNIT_CHARS: usize = 5;

/// A non-empty owned string of at most `MAX` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BoundedLabel<const MAX: usize>(String);

/// Sensor identifier, e.g. `motor_temp_01`.
pub type SensorName = BoundedLabel<MAX_SENSOR_NAME_CHARS>;

/// Measurement unit, e.g. `C` or `A`.
pub type UnitLabel = BoundedLabel<MAX_UNIT_CHARS>;

impl<const MAX: usize> BoundedLabel<MAX> {
    /// Validate and wrap `value`.
    ///
    /// Returns `CoreError::Validation` if the value is empty or longer
    /// than `MAX` characters.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::Validation("label must not be empty".to_string()));
        }
        let len = value.chars().count();
        if len > MAX {
            return Err(CoreError::Validation(format!(
                "label '{value}' is {len} characters, maximum is {MAX}"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> AsRef<str> for BoundedLabel<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> fmt::Display for BoundedLabel<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MAX: usize> TryFrom<&str> for BoundedLabel<MAX> {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single threshold crossing, produced by the sampler and consumed
/// exactly once by the notification dispatcher.
///
/// Fields are private so an event cannot be altered after it has been
/// raised; ownership moves through the alert queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    sensor_name: SensorName,
    value: f32,
    unit: UnitLabel,
    threshold: f32,
    raised_at: Timestamp,
}

impl AlertEvent {
    pub fn new(sensor_name: SensorName, value: f32, unit: UnitLabel, threshold: f32) -> Self {
        Self {
            sensor_name,
            value,
            unit,
            threshold,
            raised_at: chrono::Utc::now(),
        }
    }

    pub fn sensor_name(&self) -> &SensorName {
        &self.sensor_name
    }

    /// The reading that crossed the threshold.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn unit(&self) -> &UnitLabel {
        &self.unit
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// When the crossing was detected (UTC).
    pub fn raised_at(&self) -> Timestamp {
        self.raised_at
    }
}
