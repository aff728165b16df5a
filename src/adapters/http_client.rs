//! Outbound JSON fetching with timeout and linear-backoff retry.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, RANGE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{Result, UpstreamError};

/// Outcome of a lightweight reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: Option<u16>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// The single seam between the gateway and the network.
#[async_trait]
pub trait JsonFetch: Send + Sync {
    /// GET `url` and decode the body as JSON.
    async fn fetch_json(&self, url: &str) -> std::result::Result<Value, UpstreamError>;

    /// HEAD `url` (falling back to a ranged GET) and report the status, never failing.
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Retry policy for [`HttpClient`]
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub retries: u32,
    /// Delay unit; attempt `n` waits `backoff * (n + 1)`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff * (attempt + 1)
    }
}

/// reqwest-backed [`JsonFetch`]
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str, policy: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, policy })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Self::new(
            cfg.fetch_timeout(),
            &cfg.user_agent,
            RetryPolicy {
                retries: cfg.fetch_retries,
                ..RetryPolicy::default()
            },
        )
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Value, UpstreamError> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Transient {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {}", status),
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| UpstreamError::invalid_payload(url, e.to_string()))
    }

    async fn probe_with(&self, url: &str, method: Method) -> ProbeOutcome {
        let start = Instant::now();
        let mut req = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, "text/html,application/xhtml+xml");
        if method == Method::GET {
            req = req.header(RANGE, "bytes=0-1024");
        }
        let result = req.send().await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(resp) => ProbeOutcome {
                status: Some(resp.status().as_u16()),
                latency_ms,
                error: None,
            },
            Err(e) => ProbeOutcome {
                status: None,
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}

fn classify_reqwest_error(url: &str, err: &reqwest::Error) -> UpstreamError {
    let reason = if err.is_timeout() {
        "timeout".to_string()
    } else {
        err.to_string()
    };
    UpstreamError::Transient {
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        reason,
    }
}

#[async_trait]
impl JsonFetch for HttpClient {
    async fn fetch_json(&self, url: &str) -> std::result::Result<Value, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(value) => {
                    debug!(url, attempt, "upstream fetch ok");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.retries => {
                    let delay = self.policy.delay(attempt);
                    warn!(
                        url,
                        attempt = attempt + 1,
                        error = %err,
                        "upstream fetch failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn probe(&self, url: &str) -> ProbeOutcome {
        let head = self.probe_with(url, Method::HEAD).await;
        match head.status {
            Some(405) | None => self.probe_with(url, Method::GET).await,
            Some(_) => head,
        }
    }
}
