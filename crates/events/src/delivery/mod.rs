//! External delivery channels.
//!
//! - [`Forwarder`] submits one reading to the ingestion endpoint
//!   ([`ingest::HttpForwarder`]).
//! - [`Notifier`] sends one alert through a session-oriented channel
//!   ([`email::EmailNotifier`], or [`LogNotifier`] when SMTP is not
//!   configured).
//!
//! Both are attempted once. Callers log failures and move on.

pub mod email;
pub mod ingest;

use async_trait::async_trait;
use motorwatch_core::{AlertEvent, Reading};

pub use email::{EmailConfig, EmailNotifier};
pub use ingest::{HttpForwarder, IngestError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure of a single alert delivery. Each variant carries the
/// collaborator's reason string.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The session could not be opened (DNS, TCP, TLS, authentication).
    #[error("Notification connect failed: {0}")]
    Connect(String),

    /// A sender or recipient address could not be parsed.
    #[error("Notification address invalid: {0}")]
    Address(String),

    /// The message could not be assembled.
    #[error("Notification compose failed: {0}")]
    Compose(String),

    /// The session opened but the message was rejected or lost.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Submits readings to the remote ingestion endpoint.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward_reading(&self, reading: &Reading) -> Result<(), IngestError>;
}

/// Delivers a single alert: connect, compose, send, close.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver_alert(&self, alert: &AlertEvent) -> Result<(), NotifyError>;
}

/// Notifier that only writes the alert to the log.
///
/// Used when no SMTP relay is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver_alert(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        tracing::warn!(
            sensor = %alert.sensor_name(),
            value = alert.value(),
            unit = %alert.unit(),
            threshold = alert.threshold(),
            raised_at = %alert.raised_at().to_rfc3339(),
            "ALERT: threshold exceeded (no SMTP relay configured)"
        );
        Ok(())
    }
}
