//! `motorwatch-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod dispatcher;
pub mod link;
pub mod sampler;
pub mod sensors;
