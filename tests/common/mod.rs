#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use scoreline::{
    adapters::{JsonFetch, ProbeOutcome},
    api::{create_router, AppState},
    cache::ManualClock,
    config::AppConfig,
    error::UpstreamError,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// 2025-10-09T08:53:20Z
pub const NOW: i64 = 1_760_000_000_000;

pub const STREAM_BASE: &str = "https://streamed.test/api";
pub const SITE_BASE: &str = "https://site.test";
pub const CORE_BASE: &str = "https://core.test";

enum Scripted {
    Body(Value),
    Status(u16),
}

/// In-memory upstream: scripted responses by exact URL, everything else is a 404.
#[derive(Default)]
pub struct FakeUpstream {
    routes: Mutex<HashMap<String, Scripted>>,
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every fetch sleeps for `delay`, so concurrent fetches overlap.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn serve(&self, url: &str, body: Value) {
        self.routes.lock().unwrap().insert(url.to_string(), Scripted::Body(body));
    }

    pub fn serve_status(&self, url: &str, status: u16) {
        self.routes.lock().unwrap().insert(url.to_string(), Scripted::Status(status));
    }

    /// While set, every fetch times out.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, fragment: &str) -> usize {
        self.calls().iter().filter(|url| url.contains(fragment)).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonFetch for FakeUpstream {
    async fn fetch_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::transient(url, "timed out"));
        }
        match self.routes.lock().unwrap().get(url) {
            Some(Scripted::Body(body)) => Ok(body.clone()),
            Some(Scripted::Status(404)) | None => Err(UpstreamError::NotFound { url: url.to_string() }),
            Some(Scripted::Status(status)) => Err(UpstreamError::Transient {
                url: url.to_string(),
                status: Some(*status),
                reason: format!("status {status}"),
            }),
        }
    }

    async fn probe(&self, _url: &str) -> ProbeOutcome {
        ProbeOutcome {
            status: Some(200),
            latency_ms: 1,
            error: None,
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        stream_api_bases: vec![STREAM_BASE.to_string()],
        streamed_image_base: "https://img.test".to_string(),
        embed_base_url: "https://embed.test/embed".to_string(),
        espn_site_api_base: SITE_BASE.to_string(),
        espn_core_api_base: CORE_BASE.to_string(),
        ..AppConfig::default()
    }
}

pub fn app_with(fake: Arc<FakeUpstream>, clock: Arc<ManualClock>, config: AppConfig) -> Router {
    let state = AppState::new(config, fake, clock).expect("state");
    create_router(state)
}

pub fn app(fake: Arc<FakeUpstream>, clock: Arc<ManualClock>) -> Router {
    app_with(fake, clock, test_config())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ── Upstream URLs ───────────────────────────────────────────────

pub fn live_url() -> String {
    format!("{STREAM_BASE}/matches/live")
}

pub fn all_url() -> String {
    format!("{STREAM_BASE}/matches/all")
}

pub fn site_url(sport: &str, league: &str, tail: &str) -> String {
    format!("{SITE_BASE}/apis/site/v2/sports/{sport}/{league}/{tail}")
}

pub fn stats_url(sport: &str, league: &str, season: i32, athlete: &str) -> String {
    format!("{CORE_BASE}/v2/sports/{sport}/leagues/{league}/seasons/{season}/types/2/athletes/{athlete}/statistics")
}
