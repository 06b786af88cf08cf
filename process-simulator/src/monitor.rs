//! Client for the process monitoring API
//!
//! One POST per cycle carrying the reading batch. The response body is parsed as
//! a JSON object and the counters are read best-effort: a missing counter is 0.

use crate::readings::Batch;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Anything that can go wrong during one submission
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Counters reported back by the monitoring API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerResult {
    pub processed: i64,
    pub triggers_detected: i64,
    pub es_notifications: i64,
}

impl ServerResult {
    /// Extract the counters from a response object, defaulting absent ones to 0
    ///
    /// Negative integers are kept as sent. An integral float (`2.0`) counts as
    /// that integer; any other value is treated as absent.
    pub fn from_body(body: &Map<String, Value>) -> Self {
        let counter = |key: &str| body.get(key).and_then(integer_counter).unwrap_or(0);

        ServerResult {
            processed: counter("processed"),
            triggers_detected: counter("triggers_detected"),
            es_notifications: counter("es_notifications"),
        }
    }
}

fn integer_counter(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// HTTP client bound to one monitoring endpoint
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    api_url: String,
}

impl MonitorClient {
    pub fn new(api_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("process-simulator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MonitorClient {
            http,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// POST the batch and read back the server counters
    pub async fn submit(&self, batch: &Batch) -> Result<ServerResult, CycleError> {
        debug!("Posting {} readings to {}", batch.data.len(), self.api_url);

        let response = self.http.post(&self.api_url).json(batch).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Body is still parsed, counters come from whatever the server sent
            warn!("Monitor API answered with status {}", status);
        }

        let bytes = response.bytes().await?;
        let body: Map<String, Value> = serde_json::from_slice(&bytes)?;

        Ok(ServerResult::from_body(&body))
    }
}
