//! Export pipeline: build a batch, push it, reset the latency window on success.
//!
//! Each tick walks `Idle -> Building -> Sending -> (Success | Failure) -> Idle`.
//! The walk is expressed by `TickOutcome`; nothing is shared between ticks
//! except the counters store, so overlapping ticks need no coordination beyond
//! the scoped latency reset.

pub mod scheduler;
pub mod sink;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lineflux_core::error::{LineFluxError, Result};
use lineflux_core::{Batch, CountersSnapshot, CountersStore};

use crate::sampler::HostSampler;

pub use scheduler::{spawn_schedule, ScheduleHandle};
pub use sink::{HttpSink, MetricsSink};

/// Line separator for the pushed body.
pub const LINE_SEPARATOR: &str = "\n";

/// Result of one tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// Backend acknowledged; `window_reset` is false when a newer max arrived
    /// after the snapshot and was kept.
    Pushed { lines: usize, window_reset: bool },
    /// Nothing was sent.
    BuildFailed(LineFluxError),
    /// Sent but not acknowledged; nothing was reset.
    PushFailed(LineFluxError),
}

impl TickOutcome {
    pub fn is_pushed(&self) -> bool {
        matches!(self, TickOutcome::Pushed { .. })
    }
}

/// Pure aggregation step: sample the host, read the store, build every line.
///
/// Any failure discards the whole batch.
pub fn build_snapshot(
    store: &CountersStore,
    sampler: &dyn HostSampler,
    source: &str,
) -> Result<(Batch, CountersSnapshot)> {
    let system = sampler.sample()?;
    let mut batch = Batch::new(source);
    let snap = store.snapshot_and_describe(&mut batch, &system)?;
    Ok((batch, snap))
}

#[derive(Clone)]
pub struct Exporter {
    inner: Arc<ExporterInner>,
}

struct ExporterInner {
    store: Arc<CountersStore>,
    sampler: Arc<dyn HostSampler>,
    sink: Arc<dyn MetricsSink>,
    source: String,
    ticks: AtomicU64,
}

impl Exporter {
    pub fn new(
        store: Arc<CountersStore>,
        sampler: Arc<dyn HostSampler>,
        sink: Arc<dyn MetricsSink>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ExporterInner {
                store,
                sampler,
                sink,
                source: source.into(),
                ticks: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &Arc<CountersStore> {
        &self.inner.store
    }

    /// Build the payload the next tick would push, without sending it.
    pub fn preview(&self) -> Result<String> {
        let (batch, _) = build_snapshot(
            &self.inner.store,
            self.inner.sampler.as_ref(),
            &self.inner.source,
        )?;
        Ok(batch.render(LINE_SEPARATOR))
    }

    /// Run one build-serialize-send cycle.
    pub async fn run_tick(&self) -> TickOutcome {
        let tick = self.inner.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::debug!(tick, "building metrics batch");
        let (batch, snap) = match build_snapshot(
            &self.inner.store,
            self.inner.sampler.as_ref(),
            &self.inner.source,
        ) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tick, kind = e.kind().as_str(), error = %e, "metrics tick aborted");
                return TickOutcome::BuildFailed(e);
            }
        };

        let lines = batch.len();
        let body = batch.render(LINE_SEPARATOR);

        tracing::debug!(tick, lines, "pushing metrics batch");
        match self.inner.sink.push(body).await {
            Ok(()) => {
                let window_reset = self.inner.store.reset_latency_window_if_unchanged(&snap.latency);
                tracing::info!(tick, lines, window_reset, "pushed metrics");
                TickOutcome::Pushed { lines, window_reset }
            }
            Err(e) => {
                tracing::warn!(tick, kind = e.kind().as_str(), error = %e, "metrics push failed");
                TickOutcome::PushFailed(e)
            }
        }
    }
}
