//! Sensor readings and the conditioning applied to raw samples.

use serde::Serialize;

use crate::alert::{SensorName, UnitLabel};
use crate::error::CoreError;

/// Value reported by the temperature probe when it is disconnected or
/// faulted.
pub const INVALID_TEMPERATURE_C: f32 = -127.0;

/// Current readings below this magnitude are treated as zero.
pub const CURRENT_NOISE_FLOOR_A: f32 = 0.05;

/// Default temperature sensor identifier.
pub const DEFAULT_TEMP_SENSOR_ID: &str = "motor_temp_01";

/// Default current sensor identifier.
pub const DEFAULT_CURRENT_SENSOR_ID: &str = "motor_current_01";

/// Degrees Celsius.
pub const UNIT_CELSIUS: &str = "C";

/// Amperes (RMS).
pub const UNIT_AMPS: &str = "A";

/// Map a raw probe value to `None` when it is the invalid-reading sentinel.
pub fn classify_temperature(raw: f32) -> Option<f32> {
    if raw == INVALID_TEMPERATURE_C || raw.is_nan() {
        None
    } else {
        Some(raw)
    }
}

/// Clamp sub-noise-floor current to zero.
pub fn apply_noise_floor(raw: f32) -> f32 {
    if raw < CURRENT_NOISE_FLOOR_A {
        0.0
    } else {
        raw
    }
}

/// One named measurement as forwarded to the ingestion endpoint.
///
/// Serializes to `{"sensor": ..., "value": ..., "unit": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    #[serde(rename = "sensor")]
    pub sensor_id: SensorName,
    pub value: f32,
    pub unit: UnitLabel,
}

/// Identity of one monitored quantity: its sensor id and unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorChannel {
    pub id: SensorName,
    pub unit: UnitLabel,
}

impl SensorChannel {
    pub fn new(id: &str, unit: &str) -> Result<Self, CoreError> {
        Ok(Self {
            id: SensorName::new(id)?,
            unit: UnitLabel::new(unit)?,
        })
    }

    /// Channel for the motor temperature probe with the given id.
    pub fn temperature(id: &str) -> Result<Self, CoreError> {
        Self::new(id, UNIT_CELSIUS)
    }

    /// Channel for the current transducer with the given id.
    pub fn current(id: &str) -> Result<Self, CoreError> {
        Self::new(id, UNIT_AMPS)
    }

    pub fn reading(&self, value: f32) -> Reading {
        Reading {
            sensor_id: self.id.clone(),
            value,
            unit: self.unit.clone(),
        }
    }
}
