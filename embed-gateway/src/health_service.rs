//! Health probes for the remote encoder servers.
//!
//! Each encoder is probed with `GET {endpoint}/health`. The returned
//! [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::encoder_config::EncoderConfig;
use crate::error_handler::{EmbedError, Result, make_snippet};

/// One encoder endpoint to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Logical role (`"text"` or `"image"`).
    pub encoder: &'static str,
    pub endpoint: String,
    pub model: String,
}

impl ProbeTarget {
    pub fn new(encoder: &'static str, cfg: &EncoderConfig) -> Self {
        Self {
            encoder,
            endpoint: cfg.base_url().to_string(),
            model: cfg.model.clone(),
        }
    }
}

/// A serializable health snapshot for a single encoder.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub encoder: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(target: &ProbeTarget, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            encoder: target.encoder.to_string(),
            endpoint: target.endpoint.clone(),
            model: target.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with the given probe timeout (seconds).
    ///
    /// # Errors
    /// Returns [`EmbedError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(timeout_secs = timeout.as_secs(), "HealthService initialized");
        Ok(Self { client })
    }

    /// Probes one encoder. Never returns an error.
    pub async fn check(&self, target: &ProbeTarget) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(target).await {
            Ok(()) => {
                let latency = start.elapsed().as_millis();
                debug!(
                    encoder = target.encoder,
                    endpoint = %target.endpoint,
                    latency_ms = latency,
                    "health probe completed"
                );
                HealthStatus::new(target, true, latency, "encoder is healthy")
            }
            Err(err) => {
                let status =
                    HealthStatus::new(target, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    encoder = target.encoder,
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Probes every target in order.
    pub async fn check_all(&self, targets: &[ProbeTarget]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(targets.len());
        for t in targets {
            out.push(self.check(t).await);
        }
        out
    }

    async fn try_probe(&self, target: &ProbeTarget) -> Result<()> {
        let url = format!("{}/health", target.endpoint);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(EmbedError::HttpStatus {
            status,
            url,
            snippet: make_snippet(&text),
        })
    }
}
