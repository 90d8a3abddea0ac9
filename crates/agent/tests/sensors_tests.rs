//! Integration tests for the sensor backends.
//!
//! The hwmon backend is exercised against temporary files standing in for
//! sysfs attributes; the simulated backend is checked for staying inside its
//! configured envelope.

use std::path::PathBuf;

use motorwatch_agent::sensors::{HwmonSensors, SensorSource, SimulatedSensors};
use tempfile::TempDir;

fn attribute(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Test: hwmon temperature
// ---------------------------------------------------------------------------

#[test]
fn hwmon_reads_millidegrees() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "26500\n");
    let mut sensors = HwmonSensors::new(temp, None);

    assert_eq!(sensors.read_temperature(), Some(26.5));
}

#[test]
fn hwmon_sentinel_temperature_is_invalid() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "-127000");
    let mut sensors = HwmonSensors::new(temp, None);

    assert_eq!(sensors.read_temperature(), None);
}

#[test]
fn hwmon_missing_temperature_file_is_invalid() {
    let dir = TempDir::new().unwrap();
    let mut sensors = HwmonSensors::new(dir.path().join("absent"), None);

    assert_eq!(sensors.read_temperature(), None);
}

#[test]
fn hwmon_garbage_temperature_is_invalid() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "not-a-number");
    let mut sensors = HwmonSensors::new(temp, None);

    assert_eq!(sensors.read_temperature(), None);
}

#[test]
fn hwmon_picks_up_updated_values() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "20000");
    let mut sensors = HwmonSensors::new(temp.clone(), None);

    assert_eq!(sensors.read_temperature(), Some(20.0));
    std::fs::write(&temp, "31000").unwrap();
    assert_eq!(sensors.read_temperature(), Some(31.0));
}

// ---------------------------------------------------------------------------
// Test: hwmon current
// ---------------------------------------------------------------------------

#[test]
fn hwmon_reads_milliamps() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "20000");
    let curr = attribute(&dir, "curr1_input", "310");
    let mut sensors = HwmonSensors::new(temp, Some(curr));

    assert_eq!(sensors.read_current(), 0.31);
}

#[test]
fn hwmon_current_below_noise_floor_reads_zero() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "20000");
    let curr = attribute(&dir, "curr1_input", "40");
    let mut sensors = HwmonSensors::new(temp, Some(curr));

    assert_eq!(sensors.read_current(), 0.0);
}

#[test]
fn hwmon_without_current_channel_reads_zero() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "20000");
    let mut sensors = HwmonSensors::new(temp, None);

    assert_eq!(sensors.read_current(), 0.0);
}

#[test]
fn hwmon_unreadable_current_reads_zero() {
    let dir = TempDir::new().unwrap();
    let temp = attribute(&dir, "temp1_input", "20000");
    let mut sensors = HwmonSensors::new(temp, Some(dir.path().join("absent")));

    assert_eq!(sensors.read_current(), 0.0);
}

// ---------------------------------------------------------------------------
// Test: simulated backend
// ---------------------------------------------------------------------------

#[test]
fn simulated_walk_stays_in_range() {
    let mut sensors = SimulatedSensors::with_seed(7);

    for _ in 0..5_000 {
        if let Some(t) = sensors.read_temperature() {
            assert!((15.0..=45.0).contains(&t), "temperature {t} out of range");
        }
        let c = sensors.read_current();
        assert!((0.0..=2.0).contains(&c), "current {c} out of range");
        assert!(c == 0.0 || c >= 0.05, "current {c} below noise floor");
    }
}

#[test]
fn simulated_walk_is_reproducible_with_seed() {
    let mut a = SimulatedSensors::with_seed(42);
    let mut b = SimulatedSensors::with_seed(42);

    for _ in 0..100 {
        assert_eq!(a.read_temperature(), b.read_temperature());
        assert_eq!(a.read_current(), b.read_current());
    }
}

#[test]
fn simulated_probe_occasionally_faults() {
    let mut sensors = SimulatedSensors::with_seed(1);
    let faults = (0..10_000)
        .filter(|_| sensors.read_temperature().is_none())
        .count();

    assert!(faults > 0, "expected at least one simulated dropout");
    assert!(faults < 1_000, "dropout rate far above configured 1%: {faults}");
}
