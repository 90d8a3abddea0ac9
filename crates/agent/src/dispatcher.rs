//! Notification dispatcher.
//!
//! Parks on the alert queue and, for each event, runs one complete
//! notification session through the configured [`Notifier`]. Failures are
//! logged with the notifier's reason and the event is discarded; nothing
//! is retried or re-queued. After every event the dispatcher pauses for
//! the configured cooldown, bounding the rate of outbound attempts.

use std::sync::Arc;
use std::time::Duration;

use motorwatch_core::AlertEvent;
use motorwatch_events::{AlertReceiver, LinkMonitor, Notifier};
use tokio_util::sync::CancellationToken;

/// Outcome of handling a single alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The notifier failed; carries its reason.
    Failed(String),
    /// The link was down so no session was attempted.
    SkippedLinkDown,
}

pub struct NotificationDispatcher {
    receiver: AlertReceiver,
    notifier: Arc<dyn Notifier>,
    link: Arc<dyn LinkMonitor>,
    cooldown: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        receiver: AlertReceiver,
        notifier: Arc<dyn Notifier>,
        link: Arc<dyn LinkMonitor>,
        cooldown: Duration,
    ) -> Self {
        Self {
            receiver,
            notifier,
            link,
            cooldown,
        }
    }

    /// Run until cancelled or until every alert sender is dropped.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            cooldown_ms = self.cooldown.as_millis() as u64,
            "Notification dispatcher started"
        );

        loop {
            let alert = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification dispatcher shutting down");
                    break;
                }
                next = self.receiver.receive() => match next {
                    Some(alert) => alert,
                    None => {
                        tracing::info!("Alert queue closed, dispatcher shutting down");
                        break;
                    }
                },
            };

            self.handle(&alert).await;

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification dispatcher shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.cooldown) => {}
            }
        }
    }

    /// Deliver one alert, logging the outcome.
    pub async fn handle(&self, alert: &AlertEvent) -> DeliveryOutcome {
        if !self.link.is_up() {
            tracing::warn!(
                sensor = %alert.sensor_name(),
                value = alert.value(),
                "Link down, alert not delivered"
            );
            return DeliveryOutcome::SkippedLinkDown;
        }

        match self.notifier.deliver_alert(alert).await {
            Ok(()) => {
                tracing::info!(
                    sensor = %alert.sensor_name(),
                    value = alert.value(),
                    threshold = alert.threshold(),
                    "Alert delivered"
                );
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::error!(
                    sensor = %alert.sensor_name(),
                    value = alert.value(),
                    error = %e,
                    "Alert delivery failed"
                );
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}
