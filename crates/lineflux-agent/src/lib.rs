//! lineflux agent library entry.
//!
//! Wires config, host sampling, the export pipeline and the request tracking
//! middleware around the core counters store. Consumed by the binary
//! (`main.rs`), by host services embedding the agent, and by integration tests.

pub mod app_state;
pub mod config;
pub mod export;
pub mod middleware;
pub mod ops;
pub mod router;
pub mod sampler;
