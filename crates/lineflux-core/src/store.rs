//! Counters store.
//!
//! Every field is an independent atomic, so each recording call is atomic with
//! respect to a concurrent `snapshot`. Cumulative counters are never reset;
//! only the latency window is, and only by the exporter after a successful push.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;

use crate::error::Result;
use crate::line::Batch;
use crate::system::SystemUsage;

pub const REQUEST_CATEGORY: &str = "request";
pub const USERS_CATEGORY: &str = "activeUsers";
pub const AUTH_CATEGORY: &str = "auth";
pub const LATENCY_CATEGORY: &str = "latency";

/// Domain label used when none is configured.
pub const DEFAULT_DOMAIN: &str = "pizza";

/// Methods with a dedicated breakdown counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Put,
}

impl HttpMethod {
    /// Breakdown order on the wire.
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Put,
    ];

    /// Exact, case-sensitive match.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            "PUT" => Some(HttpMethod::Put),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Which latency maximum an observation feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyCategory {
    /// Every request.
    Service,
    /// Domain-critical routes only.
    Domain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub get: u64,
    pub post: u64,
    pub delete: u64,
    pub put: u64,
}

impl MethodCounts {
    pub fn count(&self, method: HttpMethod) -> u64 {
        match method {
            HttpMethod::Get => self.get,
            HttpMethod::Post => self.post,
            HttpMethod::Delete => self.delete,
            HttpMethod::Put => self.put,
        }
    }

    pub fn sum(&self) -> u64 {
        self.get + self.post + self.delete + self.put
    }
}

/// Latency maxima (milliseconds) since the last successful export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatencySnapshot {
    pub service_ms: u64,
    pub domain_ms: u64,
}

/// Plain copy of the store taken by one read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountersSnapshot {
    pub domain: String,
    pub total_requests: u64,
    pub method_counts: MethodCounts,
    pub active_users: i64,
    pub auth_success: u64,
    pub auth_failure: u64,
    pub items_sold: u64,
    pub creation_failures: u64,
    pub revenue: f64,
    pub latency: LatencySnapshot,
}

impl CountersSnapshot {
    pub fn describe_requests(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(REQUEST_CATEGORY, "all", "total", self.total_requests)?;
        for m in HttpMethod::ALL {
            batch.add_line(REQUEST_CATEGORY, m.as_str(), "total", self.method_counts.count(m))?;
        }
        Ok(())
    }

    pub fn describe_users(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(USERS_CATEGORY, "all", "total", self.active_users)
    }

    /// Business counters go under the domain label as category.
    pub fn describe_business(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(&self.domain, "sold", "total", self.items_sold)?;
        batch.add_line(&self.domain, "creationFailures", "total", self.creation_failures)?;
        batch.add_line(&self.domain, "revenue", "total", self.revenue)
    }

    pub fn describe_auth(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(AUTH_CATEGORY, "success", "total", self.auth_success)?;
        batch.add_line(AUTH_CATEGORY, "failure", "total", self.auth_failure)
    }

    pub fn describe_latency(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(LATENCY_CATEGORY, "service", "total", self.latency.service_ms)?;
        batch.add_line(LATENCY_CATEGORY, &self.domain, "total", self.latency.domain_ms)
    }

    /// All categories in wire order: requests, system, users, business, auth, latency.
    pub fn describe(&self, batch: &mut Batch, system: &SystemUsage) -> Result<()> {
        self.describe_requests(batch)?;
        system.describe(batch)?;
        self.describe_users(batch)?;
        self.describe_business(batch)?;
        self.describe_auth(batch)?;
        self.describe_latency(batch)
    }
}

#[derive(Debug, Default)]
struct LatencyWindow {
    service_ms: AtomicU64,
    domain_ms: AtomicU64,
}

impl LatencyWindow {
    fn slot(&self, category: LatencyCategory) -> &AtomicU64 {
        match category {
            LatencyCategory::Service => &self.service_ms,
            LatencyCategory::Domain => &self.domain_ms,
        }
    }
}

/// Process-wide aggregated values. Construct once and share behind an `Arc`.
#[derive(Debug)]
pub struct CountersStore {
    domain: String,
    total_requests: AtomicU64,
    method_counts: [AtomicU64; 4],
    active_users: AtomicI64,
    auth_success: AtomicU64,
    auth_failure: AtomicU64,
    items_sold: AtomicU64,
    creation_failures: AtomicU64,
    // f64 bit pattern; 0 bits == 0.0
    revenue_bits: AtomicU64,
    latency: LatencyWindow,
}

impl Default for CountersStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CountersStore {
    pub fn new() -> Self {
        Self::with_domain(DEFAULT_DOMAIN)
    }

    /// Store whose business category and domain-latency tag use `domain`.
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            total_requests: AtomicU64::new(0),
            method_counts: Default::default(),
            active_users: AtomicI64::new(0),
            auth_success: AtomicU64::new(0),
            auth_failure: AtomicU64::new(0),
            items_sold: AtomicU64::new(0),
            creation_failures: AtomicU64::new(0),
            revenue_bits: AtomicU64::new(0),
            latency: LatencyWindow::default(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Count a request. Unrecognized methods only count toward the total.
    pub fn record_request(&self, method: &str) {
        // total before breakdown; `snapshot` reads in the opposite order
        self.total_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(m) = HttpMethod::parse(method) {
            self.method_counts[m.index()].fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_auth_attempt(&self, success: bool) {
        if success {
            self.auth_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.auth_failure.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// The three effects are independent; revenue is added only when positive.
    pub fn record_sale(&self, sold: bool, creation_failed: bool, revenue: f64) {
        if sold {
            self.items_sold.fetch_add(1, Ordering::SeqCst);
        }
        if creation_failed {
            self.creation_failures.fetch_add(1, Ordering::SeqCst);
        }
        if revenue > 0.0 {
            // the closure never returns None, so the update always lands
            self.revenue_bits
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                    Some((f64::from_bits(bits) + revenue).to_bits())
                })
                .ok();
        }
    }

    /// Apply a signed delta. No floor at zero.
    pub fn adjust_active_users(&self, delta: i64) {
        self.active_users.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn user_session_started(&self) {
        self.adjust_active_users(1);
    }

    pub fn user_session_ended(&self) {
        self.adjust_active_users(-1);
    }

    pub fn observe_latency(&self, category: LatencyCategory, duration_ms: u64) {
        self.latency.slot(category).fetch_max(duration_ms, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        let method_counts = MethodCounts {
            get: self.method_counts[HttpMethod::Get.index()].load(Ordering::SeqCst),
            post: self.method_counts[HttpMethod::Post.index()].load(Ordering::SeqCst),
            delete: self.method_counts[HttpMethod::Delete.index()].load(Ordering::SeqCst),
            put: self.method_counts[HttpMethod::Put.index()].load(Ordering::SeqCst),
        };
        let total_requests = self.total_requests.load(Ordering::SeqCst);

        CountersSnapshot {
            domain: self.domain.clone(),
            total_requests,
            method_counts,
            active_users: self.active_users.load(Ordering::SeqCst),
            auth_success: self.auth_success.load(Ordering::SeqCst),
            auth_failure: self.auth_failure.load(Ordering::SeqCst),
            items_sold: self.items_sold.load(Ordering::SeqCst),
            creation_failures: self.creation_failures.load(Ordering::SeqCst),
            revenue: f64::from_bits(self.revenue_bits.load(Ordering::SeqCst)),
            latency: self.latency_snapshot(),
        }
    }

    pub fn latency_snapshot(&self) -> LatencySnapshot {
        LatencySnapshot {
            service_ms: self.latency.service_ms.load(Ordering::SeqCst),
            domain_ms: self.latency.domain_ms.load(Ordering::SeqCst),
        }
    }

    /// Read once, append every category to `batch`, and return what was read.
    pub fn snapshot_and_describe(
        &self,
        batch: &mut Batch,
        system: &SystemUsage,
    ) -> Result<CountersSnapshot> {
        let snap = self.snapshot();
        snap.describe(batch, system)?;
        Ok(snap)
    }

    pub fn reset_latency_window(&self) {
        self.latency.service_ms.store(0, Ordering::SeqCst);
        self.latency.domain_ms.store(0, Ordering::SeqCst);
    }

    /// Zero each latency field that still holds the captured value.
    ///
    /// A field that grew after `captured` was taken belongs to a newer window
    /// and is left alone. Returns true when both fields were reset.
    pub fn reset_latency_window_if_unchanged(&self, captured: &LatencySnapshot) -> bool {
        let service = self
            .latency
            .service_ms
            .compare_exchange(captured.service_ms, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        let domain = self
            .latency
            .domain_ms
            .compare_exchange(captured.domain_ms, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        service && domain
    }
}
