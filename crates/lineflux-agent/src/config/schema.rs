use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use lineflux_core::error::{LineFluxError, Result};
use lineflux_core::line::check_name;
use lineflux_core::store::DEFAULT_DOMAIN;
use lineflux_core::CriticalRoutes;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub version: u32,

    /// Process source tag written into every line.
    pub source: String,

    pub metrics: MetricsSection,

    #[serde(default)]
    pub export: ExportSection,

    #[serde(default)]
    pub domain: DomainSection,

    #[serde(default)]
    pub server: ServerSection,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LineFluxError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        check_name("source", &self.source)
            .map_err(|e| LineFluxError::Config(format!("source: {e}")))?;

        self.metrics.validate()?;
        self.export.validate()?;
        self.domain.validate()?;

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    pub url: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "apiKey")]
    pub api_key: String,
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(LineFluxError::Config(
                "metrics.url must start with http:// or https://".into(),
            ));
        }
        if self.user_id.is_empty() || self.api_key.is_empty() {
            return Err(LineFluxError::Config(
                "metrics.user_id and metrics.api_key must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}:{}", self.user_id, self.api_key)
    }
}

// keep the api key out of logs
impl fmt::Debug for MetricsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsSection")
            .field("url", &self.url)
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSection {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    #[serde(default = "default_push_timeout_ms")]
    pub push_timeout_ms: u64,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            push_timeout_ms: default_push_timeout_ms(),
        }
    }
}

impl ExportSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=3_600_000).contains(&self.period_ms) {
            return Err(LineFluxError::Config(
                "export.period_ms must be between 1000 and 3600000".into(),
            ));
        }
        if !(100..=120_000).contains(&self.push_timeout_ms) {
            return Err(LineFluxError::Config(
                "export.push_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

fn default_period_ms() -> u64 {
    10_000
}
fn default_push_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainSection {
    #[serde(default = "default_domain_name")]
    pub name: String,

    /// Rules of the form "METHOD /path".
    #[serde(default = "default_critical_routes")]
    pub critical_routes: Vec<String>,
}

impl Default for DomainSection {
    fn default() -> Self {
        Self {
            name: default_domain_name(),
            critical_routes: default_critical_routes(),
        }
    }
}

impl DomainSection {
    pub fn validate(&self) -> Result<()> {
        check_name("domain.name", &self.name)
            .map_err(|e| LineFluxError::Config(format!("domain: {e}")))?;
        self.compile_routes().map(|_| ())
    }

    pub fn compile_routes(&self) -> Result<CriticalRoutes> {
        CriticalRoutes::compile(&self.critical_routes)
    }
}

fn default_domain_name() -> String {
    DEFAULT_DOMAIN.into()
}
fn default_critical_routes() -> Vec<String> {
    vec!["POST /api/order".into()]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
