//! Request-lifecycle instrumentation.
//!
//! `on_request_start` must run once per inbound request before any handler
//! logic; `on_request_finish` once per completed request, error responses
//! included. Both only touch atomics and never fail.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LineFluxError, Result};
use crate::store::{CountersStore, LatencyCategory};

/// Decides whether a (route, method) pair is domain-critical.
pub trait RouteSelector: Send + Sync {
    fn is_domain_critical(&self, route: &str, method: &str) -> bool;
}

impl<F> RouteSelector for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn is_domain_critical(&self, route: &str, method: &str) -> bool {
        self(route, method)
    }
}

/// Compiled `"METHOD /path"` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalRoute {
    pub method: Option<String>, // None => any method
    pub path: String,
}

/// Exact-path route list.
#[derive(Debug, Clone, Default)]
pub struct CriticalRoutes {
    rules: Vec<CriticalRoute>,
}

impl CriticalRoutes {
    /// Compile rules of the form `"POST /api/order"` or `"* /api/order"`.
    pub fn compile(raw: &[String]) -> Result<Self> {
        let mut rules = Vec::with_capacity(raw.len());
        for s in raw {
            let (method, path) = s.trim().split_once(' ').ok_or_else(|| {
                LineFluxError::Config(format!(
                    "invalid critical route: {s} (expected \"METHOD /path\")"
                ))
            })?;
            let path = path.trim();
            if !path.starts_with('/') {
                return Err(LineFluxError::Config(format!(
                    "invalid critical route path: {path} (must start with '/')"
                )));
            }
            let method = if method == "*" { None } else { Some(method.to_string()) };
            rules.push(CriticalRoute {
                method,
                path: path.to_string(),
            });
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CriticalRoute] {
        &self.rules
    }
}

impl RouteSelector for CriticalRoutes {
    fn is_domain_critical(&self, route: &str, method: &str) -> bool {
        self.rules.iter().any(|r| {
            r.path == route && r.method.as_deref().map_or(true, |m| m == method)
        })
    }
}

/// Hooks handed to request-handling code.
#[derive(Clone)]
pub struct Instrumentation {
    store: Arc<CountersStore>,
    selector: Arc<dyn RouteSelector>,
}

impl Instrumentation {
    pub fn new(store: Arc<CountersStore>, selector: Arc<dyn RouteSelector>) -> Self {
        Self { store, selector }
    }

    pub fn store(&self) -> &Arc<CountersStore> {
        &self.store
    }

    /// Raw method string, before any handler logic.
    pub fn on_request_start(&self, method: &str) {
        self.store.record_request(method);
    }

    /// After the response was produced.
    pub fn on_request_finish(&self, elapsed: Duration, route: &str, method: &str) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.store.observe_latency(LatencyCategory::Service, elapsed_ms);

        let critical = self.selector.is_domain_critical(route, method);
        if critical {
            self.store.observe_latency(LatencyCategory::Domain, elapsed_ms);
        }
        tracing::trace!(route, method, elapsed_ms, critical, "request finished");
    }
}
