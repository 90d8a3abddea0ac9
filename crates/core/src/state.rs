//! Latest-reading cell shared between the sampler and any observer.
//!
//! [`SharedStateStore`] holds one [`SharedState`] pair behind a single
//! mutex. Both fields are written under the same guard, so a reader sees
//! either the previous pair or the new pair, never a mix. Callers must not
//! perform I/O while a guard is held; the public API only exposes copy-in /
//! copy-out operations, so that holds by construction.

use std::time::Duration;

use parking_lot::Mutex;

use crate::error::CoreError;

const RESOURCE_NAME: &str = "shared_state";

/// Most recent raw readings. No history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SharedState {
    /// Degrees Celsius, possibly the invalid-reading sentinel.
    pub temperature: f32,
    /// Amperes, already noise-floor clamped.
    pub current: f32,
}

/// Mutex-guarded [`SharedState`], designed to be shared via `Arc`.
#[derive(Debug, Default)]
pub struct SharedStateStore {
    inner: Mutex<SharedState>,
}

impl SharedStateStore {
    /// Create a store initialised to zero readings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both fields, blocking until the lock is available.
    pub fn write(&self, temperature: f32, current: f32) {
        *self.inner.lock() = SharedState {
            temperature,
            current,
        };
    }

    /// Copy out the current pair, blocking until the lock is available.
    pub fn read(&self) -> SharedState {
        *self.inner.lock()
    }

    /// Like [`write`](Self::write) but gives up after `timeout`.
    pub fn try_write_for(
        &self,
        temperature: f32,
        current: f32,
        timeout: Duration,
    ) -> Result<(), CoreError> {
        let mut guard = self
            .inner
            .try_lock_for(timeout)
            .ok_or_else(|| lock_timeout(timeout))?;
        *guard = SharedState {
            temperature,
            current,
        };
        Ok(())
    }

    /// Like [`read`](Self::read) but gives up after `timeout`.
    pub fn try_read_for(&self, timeout: Duration) -> Result<SharedState, CoreError> {
        self.inner
            .try_lock_for(timeout)
            .map(|guard| *guard)
            .ok_or_else(|| lock_timeout(timeout))
    }
}

fn lock_timeout(timeout: Duration) -> CoreError {
    CoreError::LockTimeout {
        resource: RESOURCE_NAME,
        waited_ms: timeout.as_millis() as u64,
    }
}
