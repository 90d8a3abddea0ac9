//! Network link availability.
//!
//! Delivery paths ask [`LinkMonitor::is_up`] before touching the network
//! and skip the call when the link is down. The flag itself is maintained
//! elsewhere (the agent's TCP prober).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Boolean "link available" query.
pub trait LinkMonitor: Send + Sync {
    fn is_up(&self) -> bool;
}

/// Shared, cheaply clonable link flag.
#[derive(Debug, Clone, Default)]
pub struct LinkFlag {
    up: Arc<AtomicBool>,
}

impl LinkFlag {
    /// Create a flag in the given initial state.
    pub fn new(up: bool) -> Self {
        Self {
            up: Arc::new(AtomicBool::new(up)),
        }
    }

    /// Record the latest link state. Returns the previous state.
    pub fn set(&self, up: bool) -> bool {
        self.up.swap(up, Ordering::AcqRel)
    }
}

impl LinkMonitor for LinkFlag {
    fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }
}
