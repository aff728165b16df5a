use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::clock::SharedClock;

/// Error tag attached to a stale response.
pub const UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    /// Write time in epoch milliseconds
    pub timestamp: i64,
}

/// A value handed back by [`ResponseCache`] together with its freshness.
#[derive(Debug, Clone)]
pub struct Cached<V> {
    pub value: V,
    pub from_cache: bool,
    pub stale: bool,
    pub cache_age_sec: u64,
    pub error: Option<&'static str>,
}

impl<V> Cached<V> {
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            from_cache: self.from_cache,
            stale: self.stale,
            cache_age_sec: self.cache_age_sec,
            error: self.error,
        }
    }
}

/// Keyed TTL cache with stale-on-error fallback.
///
/// Lookups never hold the lock across the upstream call, so two concurrent misses on
/// one key may both fetch; the later write wins.
pub struct ResponseCache<V> {
    name: &'static str,
    ttl: Duration,
    clock: SharedClock,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone + Send + Sync> ResponseCache<V> {
    pub fn new(name: &'static str, ttl: Duration, clock: SharedClock) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn age_ms(&self, entry: &CacheEntry<V>) -> i64 {
        (self.clock.now_ms() - entry.timestamp).max(0)
    }

    /// Entry younger than the TTL, if any.
    pub async fn get_fresh(&self, key: &str) -> Option<Cached<V>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        let age_ms = self.age_ms(entry);
        if (age_ms as u128) < self.ttl.as_millis() {
            Some(Cached {
                value: entry.value.clone(),
                from_cache: true,
                stale: false,
                cache_age_sec: (age_ms / 1000) as u64,
                error: None,
            })
        } else {
            None
        }
    }

    /// Serve a fresh hit, otherwise fetch and store. When the fetch fails, fall back to
    /// whatever entry exists for the key (flagged stale); with no entry the error surfaces.
    ///
    /// `force` skips the fresh-hit check but keeps the stale fallback.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, force: bool, fetch: F) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        if !force {
            if let Some(hit) = self.get_fresh(key).await {
                return Ok(hit);
            }
        }

        match fetch().await {
            Ok(value) => {
                self.insert(key, value.clone()).await;
                debug!(cache = self.name, key, "cache filled");
                Ok(Cached {
                    value,
                    from_cache: false,
                    stale: false,
                    cache_age_sec: 0,
                    error: None,
                })
            }
            Err(err) => {
                let entries = self.entries.read().await;
                match entries.get(key) {
                    Some(entry) => {
                        let cache_age_sec = (self.age_ms(entry) / 1000) as u64;
                        warn!(
                            cache = self.name,
                            key,
                            cache_age_sec,
                            error = %err,
                            "upstream failed, serving stale entry"
                        );
                        Ok(Cached {
                            value: entry.value.clone(),
                            from_cache: true,
                            stale: true,
                            cache_age_sec,
                            error: Some(UPSTREAM_UNAVAILABLE),
                        })
                    }
                    None => Err(err),
                }
            }
        }
    }

    pub async fn insert(&self, key: &str, value: V) {
        let timestamp = self.clock.now_ms();
        self.insert_at(key, value, timestamp).await;
    }

    /// Store an entry with an explicit write time.
    pub async fn insert_at(&self, key: &str, value: V, timestamp: i64) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry { value, timestamp });
    }

    pub async fn peek(&self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
