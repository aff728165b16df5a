use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::{EspnApi, JsonFetch, MatchFeed};
use crate::cache::{Caches, SharedClock};
use crate::config::AppConfig;
use crate::domain::RulesTable;
use crate::error::Result;
use crate::games::{GameBuilder, HealthProbe, LeagueClassifier};
use crate::players::{PlayerDirectory, SchemaTable};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Wall clock every cache and builder ages against
    pub clock: SharedClock,

    pub caches: Arc<Caches>,

    pub match_feed: Arc<MatchFeed>,
    pub espn: Arc<EspnApi>,

    pub builder: Arc<GameBuilder>,
    pub health: Arc<HealthProbe>,

    pub schemas: Arc<SchemaTable>,
    pub players: Arc<PlayerDirectory>,

    /// Last outcome of the streamed-matches feed, reported by `/api/health`
    pub feed_status: Arc<RwLock<FeedStatus>>,

    /// Process start, epoch milliseconds
    pub started_at_ms: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FeedStatus {
    pub last_fetch_ms: Option<i64>,
    pub last_error: Option<String>,
    pub upstream_base: Option<String>,
}

impl AppState {
    /// Wire every component against one fetcher and one clock.
    pub fn new(config: AppConfig, fetch: Arc<dyn JsonFetch>, clock: SharedClock) -> Result<Self> {
        let rules = match &config.league_rules_path {
            Some(path) => RulesTable::from_path(path)?,
            None => RulesTable::builtin()?,
        };
        let classifier = Arc::new(LeagueClassifier::new(rules));
        let caches = Arc::new(Caches::new(&config.cache_ttls(), clock.clone()));
        let espn = Arc::new(EspnApi::from_config(fetch.clone(), &config));

        Ok(Self {
            match_feed: Arc::new(MatchFeed::new(fetch.clone(), config.stream_api_bases.clone())),
            builder: Arc::new(GameBuilder::from_config(classifier, &config)),
            health: Arc::new(HealthProbe::from_config(
                fetch,
                &config,
                caches.source_health.clone(),
                clock.clone(),
            )),
            schemas: Arc::new(SchemaTable::builtin()?),
            players: Arc::new(PlayerDirectory::new(
                espn.clone(),
                caches.clone(),
                clock.clone(),
                config.players_fetch_concurrency,
            )),
            espn,
            caches,
            started_at_ms: clock.now_ms(),
            clock,
            feed_status: Arc::new(RwLock::new(FeedStatus::default())),
            config: Arc::new(config),
        })
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn uptime_seconds(&self) -> i64 {
        ((self.now_ms() - self.started_at_ms) / 1000).max(0)
    }

    pub async fn record_feed_success(&self, base: Option<String>) {
        let mut status = self.feed_status.write().await;
        status.last_fetch_ms = Some(self.now_ms());
        status.last_error = None;
        status.upstream_base = base;
    }

    pub async fn record_feed_failure(&self, error: String) {
        let mut status = self.feed_status.write().await;
        status.last_error = Some(error);
    }
}
