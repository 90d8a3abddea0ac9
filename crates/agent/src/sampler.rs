//! Periodic sample / evaluate / forward loop.
//!
//! [`Sampler::run`] ticks once per sampling period. Each tick
//! ([`Sampler::sample`]) reads both sensors, overwrites the shared state,
//! runs the edge-triggered evaluator and offers any resulting alert to the
//! alert queue without waiting. The readings are then offered, again
//! without waiting, to a single forwarding task that submits batches in
//! tick order. A slow ingestion endpoint never delays the next tick: once
//! [`FORWARD_BACKLOG`] batches are pending, newer batches are dropped.
//! Batches still pending at shutdown are discarded and counted in the log.

use std::sync::Arc;
use std::time::Duration;

use motorwatch_core::reading::INVALID_TEMPERATURE_C;
use motorwatch_core::{AlertEvaluator, Reading, SensorChannel, SharedStateStore, Thresholds};
use motorwatch_events::{AlertSender, Forwarder, LinkMonitor};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::sensors::SensorSource;

/// Cycles' worth of readings that may wait for the forwarding task.
pub const FORWARD_BACKLOG: usize = 4;

/// What happened to the alert decision in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDisposition {
    /// No new crossing this cycle.
    None,
    /// A crossing was detected and the event was queued.
    Enqueued,
    /// A crossing was detected but the queue rejected the event.
    Dropped,
}

/// Result of a single sampling cycle.
#[derive(Debug, Clone)]
pub struct Cycle {
    /// `None` when the temperature probe reported a fault.
    pub temperature: Option<f32>,
    pub current: f32,
    pub temperature_alert: bool,
    pub current_alert: bool,
    pub alert: AlertDisposition,
    /// Readings to forward: current always, temperature only when valid.
    pub readings: Vec<Reading>,
}

/// Static sampler settings.
#[derive(Debug, Clone)]
pub struct SamplerSettings {
    pub interval: Duration,
    pub thresholds: Thresholds,
    pub temperature: SensorChannel,
    pub current: SensorChannel,
}

/// Sampler/evaluator state owned by the sampling task.
pub struct Sampler {
    settings: SamplerSettings,
    sensors: Box<dyn SensorSource>,
    evaluator: AlertEvaluator,
    state: Arc<SharedStateStore>,
    alerts: AlertSender,
    forwarder: Arc<dyn Forwarder>,
    link: Arc<dyn LinkMonitor>,
}

impl Sampler {
    pub fn new(
        settings: SamplerSettings,
        sensors: Box<dyn SensorSource>,
        state: Arc<SharedStateStore>,
        alerts: AlertSender,
        forwarder: Arc<dyn Forwarder>,
        link: Arc<dyn LinkMonitor>,
    ) -> Self {
        let evaluator = AlertEvaluator::new(
            settings.thresholds,
            settings.temperature.clone(),
            settings.current.clone(),
        );
        Self {
            settings,
            sensors,
            evaluator,
            state,
            alerts,
            forwarder,
            link,
        }
    }

    pub fn evaluator(&self) -> &AlertEvaluator {
        &self.evaluator
    }

    /// Run until `cancel` fires, sampling once per configured interval.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            temp_threshold = self.settings.thresholds.temperature_c,
            current_threshold = self.settings.thresholds.current_a,
            queue_capacity = self.alerts.capacity(),
            "Sampler started",
        );

        let (batches, pending) = mpsc::channel(FORWARD_BACKLOG);
        let forward_handle = tokio::spawn(forward_loop(
            Arc::clone(&self.forwarder),
            Arc::clone(&self.link),
            pending,
            cancel.clone(),
        ));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sampler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let cycle = self.sample();
                    match batches.try_send(cycle.readings) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(
                                backlog = FORWARD_BACKLOG,
                                "Forwarding backlog full, dropping readings"
                            );
                        }
                        Err(TrySendError::Closed(_)) => {
                            tracing::warn!("Forwarding task gone, dropping readings");
                        }
                    }
                }
            }
        }

        drop(batches);
        if let Err(e) = forward_handle.await {
            tracing::error!(error = %e, "Forwarding task failed");
        }
    }

    /// One sampling cycle, without forwarding. Performs no network I/O.
    pub fn sample(&mut self) -> Cycle {
        let temperature = self.sensors.read_temperature();
        let current = self.sensors.read_current();

        self.state
            .write(temperature.unwrap_or(INVALID_TEMPERATURE_C), current);

        let evaluation = self.evaluator.evaluate(temperature, current);
        let alert = match evaluation.event {
            None => AlertDisposition::None,
            Some(event) => {
                tracing::info!(
                    sensor = %event.sensor_name(),
                    value = event.value(),
                    threshold = event.threshold(),
                    "Threshold crossed, raising alert"
                );
                if self.alerts.try_send(event) {
                    AlertDisposition::Enqueued
                } else {
                    AlertDisposition::Dropped
                }
            }
        };

        let mut readings = Vec::with_capacity(2);
        match temperature {
            Some(t) => readings.push(self.settings.temperature.reading(t)),
            None => tracing::warn!(
                sensor = %self.settings.temperature.id,
                "Invalid temperature reading, skipping"
            ),
        }
        readings.push(self.settings.current.reading(current));

        tracing::debug!(
            temperature = ?temperature,
            current,
            latch_armed = self.evaluator.latch().is_armed(),
            "Sample taken"
        );

        Cycle {
            temperature,
            current,
            temperature_alert: evaluation.temperature_alert,
            current_alert: evaluation.current_alert,
            alert,
            readings,
        }
    }
}

/// Drain reading batches in arrival order until cancelled or the sampler
/// drops its sender.
async fn forward_loop(
    forwarder: Arc<dyn Forwarder>,
    link: Arc<dyn LinkMonitor>,
    mut pending: mpsc::Receiver<Vec<Reading>>,
    cancel: CancellationToken,
) {
    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            next = pending.recv() => match next {
                Some(batch) => batch,
                None => return,
            },
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!(readings = batch.len(), "Shutdown interrupted forwarding");
                break;
            }
            _ = forward_readings(forwarder.as_ref(), link.as_ref(), &batch) => {}
        }
    }

    if !pending.is_empty() {
        tracing::warn!(batches = pending.len(), "Discarding unforwarded readings at shutdown");
    }
}

/// Submit each reading once. Returns how many were accepted.
///
/// Readings are skipped while the link is down; failures are logged and
/// never retried.
pub async fn forward_readings(
    forwarder: &dyn Forwarder,
    link: &dyn LinkMonitor,
    readings: &[Reading],
) -> usize {
    let mut accepted = 0;
    for reading in readings {
        if !link.is_up() {
            tracing::warn!(sensor = %reading.sensor_id, "Link down, reading not forwarded");
            continue;
        }
        match forwarder.forward_reading(reading).await {
            Ok(()) => accepted += 1,
            Err(e) => {
                tracing::error!(
                    sensor = %reading.sensor_id,
                    value = reading.value,
                    error = %e,
                    "Failed to forward reading"
                );
            }
        }
    }
    accepted
}
