//! Domain types and pure alerting logic for the motorwatch agent.
//!
//! Nothing in this crate performs I/O. Sensor acquisition, ingestion and
//! notification transports live in `motorwatch-events` and the agent
//! binary; this crate only decides *what* should happen with a pair of
//! readings.

pub mod alert;
pub mod error;
pub mod reading;
pub mod state;
pub mod threshold_validation;
pub mod thresholds;
pub mod types;

pub use alert::{AlertEvent, BoundedLabel, SensorName, UnitLabel};
pub use error::CoreError;
pub use reading::{Reading, SensorChannel};
pub use state::{SharedState, SharedStateStore};
pub use thresholds::{AlertEvaluator, AlertLatch, Evaluation, LatchState, Thresholds};
