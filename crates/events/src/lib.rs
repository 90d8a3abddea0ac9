//! Motorwatch alert transport and delivery infrastructure.
//!
//! - [`queue`]: bounded producer/consumer channel carrying
//!   [`AlertEvent`](motorwatch_core::AlertEvent)s from the sampler to the
//!   dispatcher.
//! - [`delivery`]: external channels: HTTP reading ingestion and SMTP
//!   alert notification.
//! - [`link`]: shared "link available" flag consulted before any network
//!   call.

pub mod delivery;
pub mod link;
pub mod queue;

pub use delivery::{
    EmailConfig, EmailNotifier, Forwarder, HttpForwarder, IngestError, LogNotifier, Notifier,
    NotifyError,
};
pub use link::{LinkFlag, LinkMonitor};
pub use queue::{alert_queue, AlertReceiver, AlertSender};
