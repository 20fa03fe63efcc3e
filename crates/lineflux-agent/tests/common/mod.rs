//! Test doubles shared by agent integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use lineflux_agent::config::{self, AgentConfig};
use lineflux_agent::export::MetricsSink;
use lineflux_agent::sampler::HostSampler;
use lineflux_core::error::{LineFluxError, Result};
use lineflux_core::SystemUsage;

pub fn config_for(url: &str) -> AgentConfig {
    let yaml = format!(
        r#"
version: 1
source: test-svc
metrics:
  url: "{url}"
  user_id: "42"
  api_key: "secret"
"#
    );
    config::load_from_str(&yaml).expect("test config must parse")
}

pub struct FixedSampler(pub SystemUsage);

impl FixedSampler {
    pub fn idle() -> Self {
        Self(SystemUsage {
            cpu_percent: 5.0,
            memory_percent: 40.0,
        })
    }
}

impl HostSampler for FixedSampler {
    fn sample(&self) -> Result<SystemUsage> {
        Ok(self.0)
    }
}

pub struct FailingSampler;

impl HostSampler for FailingSampler {
    fn sample(&self) -> Result<SystemUsage> {
        Err(LineFluxError::Sampling("load average unavailable".into()))
    }
}

/// Records every body; answers with the configured status (200 by default).
pub struct RecordingSink {
    bodies: Mutex<Vec<String>>,
    status: Mutex<u16>,
    delay: Duration,
    started: AtomicUsize,
}

impl RecordingSink {
    pub fn ok() -> Self {
        Self::with_status(200)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            bodies: Mutex::new(Vec::new()),
            status: Mutex::new(status),
            delay: Duration::ZERO,
            started: AtomicUsize::new(0),
        }
    }

    /// Every push waits `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok()
        }
    }

    pub fn set_status(&self, status: u16) {
        *self.status.lock().unwrap() = status;
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn push(&self, body: String) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.bodies.lock().unwrap().push(body);

        let status = *self.status.lock().unwrap();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(LineFluxError::PushStatus(status))
        }
    }
}
