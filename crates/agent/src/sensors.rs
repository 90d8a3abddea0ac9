//! Sensor acquisition backends.
//!
//! [`SensorSource`] is the synchronous collaborator the sampler reads once
//! per cycle. Two backends are provided:
//!
//! - [`HwmonSensors`] reads Linux sysfs attribute files (millidegree
//!   temperature, milliamp current), e.g. a thermal zone and an INA-style
//!   hwmon current channel.
//! - [`SimulatedSensors`] produces a bounded random walk for bench runs
//!   without hardware.
//!
//! Acquisition faults never panic: an unreadable probe yields an invalid
//! temperature and an unreadable transducer yields zero current.

use std::path::{Path, PathBuf};

use motorwatch_core::reading::{apply_noise_floor, classify_temperature};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synchronous access to the two monitored quantities.
pub trait SensorSource: Send {
    /// Degrees Celsius, or `None` when the probe is disconnected/faulted.
    fn read_temperature(&mut self) -> Option<f32>;

    /// RMS amperes with the noise floor already applied.
    fn read_current(&mut self) -> f32;
}

// ---------------------------------------------------------------------------
// HwmonSensors
// ---------------------------------------------------------------------------

/// Reads sysfs attribute files holding integer milli-units.
#[derive(Debug, Clone)]
pub struct HwmonSensors {
    temperature_path: PathBuf,
    /// `None` when no current channel is wired; current then reads as zero.
    current_path: Option<PathBuf>,
}

impl HwmonSensors {
    pub fn new(temperature_path: impl Into<PathBuf>, current_path: Option<PathBuf>) -> Self {
        let temperature_path = temperature_path.into();
        if current_path.is_none() {
            tracing::warn!("No current channel configured -- current will read as 0 A");
        }
        tracing::info!(
            temperature = %temperature_path.display(),
            current = ?current_path,
            "Using hwmon sensor files"
        );
        Self {
            temperature_path,
            current_path,
        }
    }
}

/// Read a sysfs file containing an integer in milli-units.
fn read_milli(path: &Path) -> std::io::Result<f32> {
    let raw = std::fs::read_to_string(path)?;
    let milli: i64 = raw.trim().parse().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("'{}' is not an integer: {e}", raw.trim()),
        )
    })?;
    Ok(milli as f32 / 1000.0)
}

impl SensorSource for HwmonSensors {
    fn read_temperature(&mut self) -> Option<f32> {
        match read_milli(&self.temperature_path) {
            Ok(celsius) => classify_temperature(celsius),
            Err(e) => {
                tracing::warn!(
                    path = %self.temperature_path.display(),
                    error = %e,
                    "Temperature probe unreadable"
                );
                None
            }
        }
    }

    fn read_current(&mut self) -> f32 {
        let Some(path) = self.current_path.as_deref() else {
            return 0.0;
        };
        match read_milli(path) {
            Ok(amps) => apply_noise_floor(amps),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Current channel unreadable");
                0.0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SimulatedSensors
// ---------------------------------------------------------------------------

const SIM_TEMP_START_C: f32 = 22.0;
const SIM_TEMP_STEP_C: f32 = 0.4;
const SIM_TEMP_RANGE_C: (f32, f32) = (15.0, 45.0);
const SIM_CURRENT_START_A: f32 = 0.2;
const SIM_CURRENT_STEP_A: f32 = 0.05;
const SIM_CURRENT_RANGE_A: (f32, f32) = (0.0, 2.0);

/// Probability that a simulated probe read comes back as a fault.
const SIM_DROPOUT_PROBABILITY: f64 = 0.01;

/// Random-walk sensor pair.
#[derive(Debug)]
pub struct SimulatedSensors {
    rng: StdRng,
    temperature: f32,
    current: f32,
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic walk for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            temperature: SIM_TEMP_START_C,
            current: SIM_CURRENT_START_A,
        }
    }
}

impl SensorSource for SimulatedSensors {
    fn read_temperature(&mut self) -> Option<f32> {
        if self.rng.random_bool(SIM_DROPOUT_PROBABILITY) {
            return None;
        }
        let step = self.rng.random_range(-SIM_TEMP_STEP_C..=SIM_TEMP_STEP_C);
        self.temperature = (self.temperature + step).clamp(SIM_TEMP_RANGE_C.0, SIM_TEMP_RANGE_C.1);
        Some(self.temperature)
    }

    fn read_current(&mut self) -> f32 {
        let step = self.rng.random_range(-SIM_CURRENT_STEP_A..=SIM_CURRENT_STEP_A);
        self.current = (self.current + step).clamp(SIM_CURRENT_RANGE_A.0, SIM_CURRENT_RANGE_A.1);
        apply_noise_floor(self.current)
    }
}
