//! Stream source health probing with a per-request check budget.

use chrono::{SecondsFormat, TimeZone, Utc};
use std::sync::Arc;
use tracing::debug;

use super::ordering::sort_sources;
use crate::adapters::http_client::JsonFetch;
use crate::cache::{ResponseCache, SharedClock};
use crate::config::AppConfig;
use crate::domain::{sanitize_slug, Game, HealthStatus, SourceHealth};

pub const BUDGET_EXHAUSTED: &str = "health_check_budget_exhausted";
pub const INVALID_TARGET: &str = "invalid_source_or_slug";

pub struct HealthProbe {
    fetch: Arc<dyn JsonFetch>,
    embed_base: String,
    cache: Arc<ResponseCache<SourceHealth>>,
    clock: SharedClock,
    max_checks: usize,
}

impl HealthProbe {
    pub fn new(
        fetch: Arc<dyn JsonFetch>,
        embed_base: impl Into<String>,
        cache: Arc<ResponseCache<SourceHealth>>,
        clock: SharedClock,
        max_checks: usize,
    ) -> Self {
        Self {
            fetch,
            embed_base: embed_base.into().trim_end_matches('/').to_string(),
            cache,
            clock,
            max_checks,
        }
    }

    pub fn from_config(fetch: Arc<dyn JsonFetch>, cfg: &AppConfig, cache: Arc<ResponseCache<SourceHealth>>, clock: SharedClock) -> Self {
        Self::new(fetch, &cfg.embed_base_url, cache, clock, cfg.max_health_checks)
    }

    pub fn embed_url(&self, source: &str, slug: &str, stream: u32) -> Option<String> {
        let (source, slug) = (sanitize_slug(source), sanitize_slug(slug));
        if source.is_empty() || slug.is_empty() {
            return None;
        }
        Some(format!("{}/{}/{}/{}", self.embed_base, source, slug, stream))
    }

    fn now_iso(&self) -> Option<String> {
        Utc.timestamp_millis_opt(self.clock.now_ms())
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Probe one embed page. Never fails; problems are reported in the result.
    pub async fn check(&self, source: &str, slug: &str, stream: u32) -> SourceHealth {
        let Some(url) = self.embed_url(source, slug, stream) else {
            return SourceHealth::unknown(INVALID_TARGET);
        };
        let outcome = self.fetch.probe(&url).await;
        debug!(url = %url, status = ?outcome.status, latency_ms = outcome.latency_ms, "probed stream source");
        SourceHealth {
            status: HealthStatus::from_http_status(outcome.status),
            http_status: outcome.status,
            latency_ms: Some(outcome.latency_ms),
            checked_at: self.now_iso(),
            error: outcome.error,
        }
    }

    /// Cached probe for `source:id:stream`, spending from `budget` only on a cache miss.
    pub async fn cached_check(&self, source: &str, id: &str, stream: u32, budget: &mut usize) -> SourceHealth {
        let key = format!("{source}:{id}:{stream}");
        if let Some(hit) = self.cache.get_fresh(&key).await {
            return hit.value;
        }
        if *budget == 0 {
            return SourceHealth::unknown(BUDGET_EXHAUSTED);
        }
        *budget -= 1;
        let health = self.check(source, id, stream).await;
        self.cache.insert(&key, health.clone()).await;
        health
    }

    /// Annotate every source with its health, re-rank sources and repoint each game at its
    /// best source. One budget covers the whole list.
    pub async fn annotate_games(&self, games: Vec<Game>) -> Vec<Game> {
        let mut budget = self.max_checks;
        let mut out = Vec::with_capacity(games.len());
        for mut game in games {
            for source in game.sources.iter_mut() {
                let health = self.cached_check(&source.source, &source.id, 1, &mut budget).await;
                source.health = Some(health);
            }
            sort_sources(&mut game.sources);
            if let Some(best) = game.sources.first() {
                game.current_source = best.source.clone();
                let slug = sanitize_slug(&best.id);
                if !slug.is_empty() {
                    game.slug = slug;
                }
            }
            out.push(game);
        }
        out
    }
}
