//! Outbound push transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use lineflux_core::error::{LineFluxError, Result};

use crate::config::MetricsSection;

/// Destination for a rendered batch.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Ok only when the backend acknowledged the payload.
    async fn push(&self, body: String) -> Result<()>;
}

/// `POST <url>` with bearer credentials and an explicit timeout.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl HttpSink {
    pub fn new(metrics: &MetricsSection, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LineFluxError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            url: metrics.url.clone(),
            authorization: metrics.bearer(),
        })
    }
}

#[async_trait]
impl MetricsSink for HttpSink {
    async fn push(&self, body: String) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LineFluxError::Push("request timed out".into())
                } else {
                    LineFluxError::Push(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LineFluxError::PushStatus(status.as_u16()));
        }
        Ok(())
    }
}
