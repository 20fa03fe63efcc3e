//! Shared application state for the lineflux agent.
//!
//! Owns the single counters store for the process and hands it to the
//! instrumentation hooks and the exporter. Startup errors are returned, not
//! panicked on.

use std::sync::Arc;

use lineflux_core::error::Result;
use lineflux_core::{CountersStore, Instrumentation};

use crate::config::AgentConfig;
use crate::export::{spawn_schedule, Exporter, HttpSink, MetricsSink, ScheduleHandle};
use crate::sampler::{HostSampler, SysinfoSampler};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<AgentConfig>,
    hooks: Instrumentation,
    exporter: Exporter,
}

impl AppState {
    /// Production wiring: sysinfo sampler and HTTP push.
    pub fn new(cfg: AgentConfig) -> Result<Self> {
        let sink = HttpSink::new(&cfg.metrics, cfg.export.push_timeout())?;
        Self::with_parts(cfg, Arc::new(SysinfoSampler::new()), Arc::new(sink))
    }

    /// Wiring with caller-supplied sampler and sink.
    pub fn with_parts(
        cfg: AgentConfig,
        sampler: Arc<dyn HostSampler>,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self> {
        let routes = cfg.domain.compile_routes()?;
        let store = Arc::new(CountersStore::with_domain(cfg.domain.name.clone()));

        let hooks = Instrumentation::new(Arc::clone(&store), Arc::new(routes));
        let exporter = Exporter::new(store, sampler, sink, cfg.source.clone());

        Ok(Self {
            cfg: Arc::new(cfg),
            hooks,
            exporter,
        })
    }

    pub fn cfg(&self) -> &AgentConfig {
        &self.cfg
    }

    pub fn store(&self) -> Arc<CountersStore> {
        Arc::clone(self.hooks.store())
    }

    pub fn hooks(&self) -> Instrumentation {
        self.hooks.clone()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Start the periodic export with the configured period.
    pub fn start_export(&self) -> ScheduleHandle {
        spawn_schedule(self.exporter.clone(), self.cfg.export.period())
    }
}
