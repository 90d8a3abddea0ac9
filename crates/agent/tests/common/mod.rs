//! In-memory collaborators shared by the agent integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use motorwatch_agent::sampler::{Sampler, SamplerSettings};
use motorwatch_agent::sensors::SensorSource;
use motorwatch_core::reading::{DEFAULT_CURRENT_SENSOR_ID, DEFAULT_TEMP_SENSOR_ID};
use motorwatch_core::{AlertEvent, Reading, SensorChannel, SharedStateStore, Thresholds};
use motorwatch_events::{
    AlertSender, Forwarder, IngestError, LinkFlag, LinkMonitor, Notifier, NotifyError,
};
use tokio::sync::Notify;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Replays a fixed series of readings, repeating the last pair when
/// exhausted.
pub struct ScriptedSensors {
    temperatures: VecDeque<Option<f32>>,
    currents: VecDeque<f32>,
    last_temperature: Option<f32>,
    last_current: f32,
}

impl ScriptedSensors {
    pub fn new(temperatures: &[Option<f32>], currents: &[f32]) -> Self {
        Self {
            temperatures: temperatures.iter().copied().collect(),
            currents: currents.iter().copied().collect(),
            last_temperature: Some(20.0),
            last_current: 0.0,
        }
    }

    /// Temperature series with zero current throughout.
    pub fn temperatures(temps: &[f32]) -> Self {
        let temps: Vec<_> = temps.iter().copied().map(Some).collect();
        Self::new(&temps, &[])
    }
}

impl SensorSource for ScriptedSensors {
    fn read_temperature(&mut self) -> Option<f32> {
        if let Some(next) = self.temperatures.pop_front() {
            self.last_temperature = next;
        }
        self.last_temperature
    }

    fn read_current(&mut self) -> f32 {
        if let Some(next) = self.currents.pop_front() {
            self.last_current = next;
        }
        self.last_current
    }
}

// ---------------------------------------------------------------------------
// Forwarder
// ---------------------------------------------------------------------------

/// Records every reading it is given; optionally fails every call or
/// stalls before answering.
#[derive(Default)]
pub struct RecordingForwarder {
    pub readings: Mutex<Vec<Reading>>,
    pub fail: bool,
    pub delay: Duration,
}

impl RecordingForwarder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn values(&self, sensor_id: &str) -> Vec<f32> {
        self.readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.sensor_id.as_str() == sensor_id)
            .map(|r| r.value)
            .collect()
    }

    pub fn sensor_ids(&self) -> Vec<String> {
        self.readings
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.sensor_id.to_string())
            .collect()
    }
}

#[async_trait]
impl Forwarder for RecordingForwarder {
    async fn forward_reading(&self, reading: &Reading) -> Result<(), IngestError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.readings.lock().unwrap().push(reading.clone());
        if self.fail {
            return Err(IngestError::HttpStatus {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifiers
// ---------------------------------------------------------------------------

/// Records every alert; optionally fails with a fixed reason.
#[derive(Default)]
pub struct RecordingNotifier {
    pub delivered: Mutex<Vec<AlertEvent>>,
    /// When each delivery started, on the tokio clock.
    pub started_at: Mutex<Vec<Instant>>,
    pub fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver_alert(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        self.started_at.lock().unwrap().push(Instant::now());
        self.delivered.lock().unwrap().push(alert.clone());
        match &self.fail_with {
            Some(reason) => Err(NotifyError::Connect(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Blocks inside its first delivery until released, simulating a slow
/// SMTP handshake.
#[derive(Default)]
pub struct GatedNotifier {
    pub started: Notify,
    pub release: Notify,
    first_done: AtomicBool,
    pub delivered_values: Mutex<Vec<f32>>,
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn deliver_alert(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        if !self.first_done.swap(true, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.delivered_values.lock().unwrap().push(alert.value());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn settings(interval: Duration) -> SamplerSettings {
    SamplerSettings {
        interval,
        thresholds: Thresholds {
            temperature_c: 25.0,
            current_a: 0.3,
        },
        temperature: SensorChannel::temperature(DEFAULT_TEMP_SENSOR_ID).unwrap(),
        current: SensorChannel::current(DEFAULT_CURRENT_SENSOR_ID).unwrap(),
    }
}

pub fn link_up() -> Arc<dyn LinkMonitor> {
    Arc::new(LinkFlag::new(true))
}

pub fn sampler(
    sensors: ScriptedSensors,
    alerts: AlertSender,
    forwarder: Arc<RecordingForwarder>,
) -> (Sampler, Arc<SharedStateStore>) {
    let state = Arc::new(SharedStateStore::new());
    let sampler = Sampler::new(
        settings(Duration::from_millis(10)),
        Box::new(sensors),
        Arc::clone(&state),
        alerts,
        forwarder,
        link_up(),
    );
    (sampler, state)
}

pub fn alert(value: f32) -> AlertEvent {
    let channel = SensorChannel::temperature(DEFAULT_TEMP_SENSOR_ID).unwrap();
    AlertEvent::new(channel.id, value, channel.unit, 25.0)
}
