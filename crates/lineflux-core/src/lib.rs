//! lineflux core: runtime-free metric aggregation and line-format primitives.
//!
//! This crate holds the counters store, the line builder, the host usage value
//! type and the request instrumentation hooks. It carries no transport or
//! runtime dependencies; scheduling, sampling and pushing live in
//! `lineflux-agent`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Recording calls never fail; fallible paths surface as `LineFluxError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod hooks;
pub mod line;
pub mod store;
pub mod system;

pub use error::{ErrorKind, LineFluxError, Result};
pub use hooks::{CriticalRoutes, Instrumentation, RouteSelector};
pub use line::{Batch, FieldValue, MetricLine};
pub use store::{CountersSnapshot, CountersStore, HttpMethod, LatencyCategory, LatencySnapshot};
pub use system::SystemUsage;
