//! Agent configuration loaded from environment variables.
//!
//! | Variable                   | Required | Default                                  |
//! |----------------------------|----------|------------------------------------------|
//! | `INGEST_URL`               | yes      | -                                        |
//! | `SAMPLE_INTERVAL_MS`       | no       | `2000`                                   |
//! | `TEMP_THRESHOLD_C`         | no       | `25.0`                                   |
//! | `CURRENT_THRESHOLD_A`      | no       | `0.3`                                    |
//! | `ALERT_QUEUE_CAPACITY`     | no       | `5`                                      |
//! | `DISPATCH_COOLDOWN_MS`     | no       | `1000`                                   |
//! | `TEMP_SENSOR_ID`           | no       | `motor_temp_01`                          |
//! | `CURRENT_SENSOR_ID`        | no       | `motor_current_01`                       |
//! | `SENSOR_SOURCE`            | no       | `simulated` (or `hwmon`)                 |
//! | `HWMON_TEMP_PATH`          | no       | `/sys/class/thermal/thermal_zone0/temp`  |
//! | `HWMON_CURRENT_PATH`       | no       | -                                        |
//! | `LINK_PROBE_ADDR`          | no       | host:port of `INGEST_URL`                |
//! | `LINK_PROBE_INTERVAL_SECS` | no       | `10`                                     |
//!
//! SMTP settings are read by [`EmailConfig::from_env`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use motorwatch_core::reading::{DEFAULT_CURRENT_SENSOR_ID, DEFAULT_TEMP_SENSOR_ID};
use motorwatch_core::threshold_validation::{validate_finite, validate_non_negative};
use motorwatch_core::thresholds::{DEFAULT_CURRENT_THRESHOLD_A, DEFAULT_TEMP_THRESHOLD_C};
use motorwatch_core::{CoreError, SensorChannel, Thresholds};
use motorwatch_events::queue::DEFAULT_CAPACITY;
use motorwatch_events::{EmailConfig, NotifyError};

const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 2000;
const DEFAULT_DISPATCH_COOLDOWN_MS: u64 = 1000;
const DEFAULT_LINK_PROBE_INTERVAL_SECS: u64 = 10;
const DEFAULT_HWMON_TEMP_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("SMTP configuration: {0}")]
    Email(#[from] NotifyError),
}

/// Which [`SensorSource`](crate::sensors::SensorSource) backend to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSourceKind {
    Simulated,
    Hwmon {
        temperature_path: PathBuf,
        current_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub ingest_url: String,
    pub sample_interval: Duration,
    pub thresholds: Thresholds,
    pub queue_capacity: usize,
    pub dispatch_cooldown: Duration,
    pub temperature: SensorChannel,
    pub current: SensorChannel,
    pub sensor_source: SensorSourceKind,
    /// `host:port` probed to decide whether the network link is up.
    pub link_probe_addr: String,
    pub link_probe_interval: Duration,
    /// `None` when `SMTP_HOST` is unset; alerts are then only logged.
    pub email: Option<EmailConfig>,
}

impl AgentConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;
        config.email = EmailConfig::from_env()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// SMTP settings are not read here; `email` is always `None`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ingest_url = lookup("INGEST_URL").ok_or(ConfigError::Missing("INGEST_URL"))?;
        let default_probe_addr = probe_addr_for(&ingest_url)?;

        let sample_interval_ms = parse_or(&lookup, "SAMPLE_INTERVAL_MS", DEFAULT_SAMPLE_INTERVAL_MS)?;
        if sample_interval_ms == 0 {
            return Err(invalid("SAMPLE_INTERVAL_MS", "must be greater than zero"));
        }

        let temperature_c = parse_or(&lookup, "TEMP_THRESHOLD_C", DEFAULT_TEMP_THRESHOLD_C)?;
        validate_finite(temperature_c, "TEMP_THRESHOLD_C")?;
        let current_a = parse_or(&lookup, "CURRENT_THRESHOLD_A", DEFAULT_CURRENT_THRESHOLD_A)?;
        validate_non_negative(current_a, "CURRENT_THRESHOLD_A")?;

        let queue_capacity = parse_or(&lookup, "ALERT_QUEUE_CAPACITY", DEFAULT_CAPACITY)?;
        if queue_capacity == 0 {
            return Err(invalid("ALERT_QUEUE_CAPACITY", "must be at least 1"));
        }

        let dispatch_cooldown_ms =
            parse_or(&lookup, "DISPATCH_COOLDOWN_MS", DEFAULT_DISPATCH_COOLDOWN_MS)?;
        let link_probe_interval_secs = parse_or(
            &lookup,
            "LINK_PROBE_INTERVAL_SECS",
            DEFAULT_LINK_PROBE_INTERVAL_SECS,
        )?;
        if link_probe_interval_secs == 0 {
            return Err(invalid("LINK_PROBE_INTERVAL_SECS", "must be greater than zero"));
        }

        let temperature = SensorChannel::temperature(
            &lookup("TEMP_SENSOR_ID").unwrap_or_else(|| DEFAULT_TEMP_SENSOR_ID.to_string()),
        )?;
        let current = SensorChannel::current(
            &lookup("CURRENT_SENSOR_ID").unwrap_or_else(|| DEFAULT_CURRENT_SENSOR_ID.to_string()),
        )?;

        let sensor_source = match lookup("SENSOR_SOURCE").as_deref() {
            None | Some("simulated") => SensorSourceKind::Simulated,
            Some("hwmon") => SensorSourceKind::Hwmon {
                temperature_path: lookup("HWMON_TEMP_PATH")
                    .unwrap_or_else(|| DEFAULT_HWMON_TEMP_PATH.to_string())
                    .into(),
                current_path: lookup("HWMON_CURRENT_PATH").map(PathBuf::from),
            },
            Some(other) => {
                return Err(invalid(
                    "SENSOR_SOURCE",
                    format!("expected 'simulated' or 'hwmon', got '{other}'"),
                ))
            }
        };

        Ok(Self {
            ingest_url,
            sample_interval: Duration::from_millis(sample_interval_ms),
            thresholds: Thresholds {
                temperature_c,
                current_a,
            },
            queue_capacity,
            dispatch_cooldown: Duration::from_millis(dispatch_cooldown_ms),
            temperature,
            current,
            sensor_source,
            link_probe_addr: lookup("LINK_PROBE_ADDR").unwrap_or(default_probe_addr),
            link_probe_interval: Duration::from_secs(link_probe_interval_secs),
            email: None,
        })
    }
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}

/// Parse `name` if set, otherwise fall back to `default`.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

/// Derive `host:port` from the ingestion URL for the link prober.
fn probe_addr_for(ingest_url: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(ingest_url).map_err(|e| invalid("INGEST_URL", e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("INGEST_URL", "URL has no host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("INGEST_URL", "URL has no port and no known default"))?;
    Ok(format!("{host}:{port}"))
}
