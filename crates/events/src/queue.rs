//! Bounded alert queue backed by a `tokio::sync::mpsc` channel.
//!
//! The sampler owns the [`AlertSender`] and must never wait on it:
//! [`AlertSender::try_send`] either enqueues immediately or drops the
//! event. The dispatcher owns the [`AlertReceiver`] and parks on
//! [`AlertReceiver::receive`] until an event arrives. Events are delivered
//! in the order they were sent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use motorwatch_core::{AlertEvent, CoreError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Reference queue capacity.
pub const DEFAULT_CAPACITY: usize = 5;

/// Create a bounded alert queue.
///
/// Returns `CoreError::Validation` for a zero capacity.
pub fn alert_queue(capacity: usize) -> Result<(AlertSender, AlertReceiver), CoreError> {
    if capacity == 0 {
        return Err(CoreError::Validation(
            "alert queue capacity must be at least 1".to_string(),
        ));
    }
    let (tx, rx) = mpsc::channel(capacity);
    let sender = AlertSender {
        tx,
        capacity,
        dropped: Arc::new(AtomicU64::new(0)),
    };
    Ok((sender, AlertReceiver { rx }))
}

// ---------------------------------------------------------------------------
// AlertSender
// ---------------------------------------------------------------------------

/// Producer half of the alert queue.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: mpsc::Sender<AlertEvent>,
    capacity: usize,
    dropped: Arc<AtomicU64>,
}

impl AlertSender {
    /// Enqueue without waiting.
    ///
    /// Returns `false` if the queue is full or the receiver is gone. The
    /// event is dropped in both cases.
    pub fn try_send(&self, event: AlertEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    sensor = %event.sensor_name(),
                    value = event.value(),
                    capacity = self.capacity,
                    dropped_total = dropped,
                    "Alert queue full, dropping alert"
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    sensor = %event.sensor_name(),
                    "Alert queue closed, dropping alert"
                );
                false
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of alerts discarded since the queue was created.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// AlertReceiver
// ---------------------------------------------------------------------------

/// Consumer half of the alert queue.
#[derive(Debug)]
pub struct AlertReceiver {
    rx: mpsc::Receiver<AlertEvent>,
}

impl AlertReceiver {
    /// Wait for the next alert.
    ///
    /// Returns `None` once every [`AlertSender`] has been dropped and the
    /// queue is drained.
    pub async fn receive(&mut self) -> Option<AlertEvent> {
        self.rx.recv().await
    }

    /// Number of alerts waiting to be received.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
