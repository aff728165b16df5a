//! Streamed-matches feed: raw match records and the multi-base fetcher.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::http_client::JsonFetch;
use crate::error::UpstreamError;

// ── Raw records ─────────────────────────────────────────────────

/// One upstream match record. Never leaves the adapters/builder boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatch {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    /// Epoch milliseconds; the feed sends numbers, occasionally strings
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub popular: Option<bool>,
    #[serde(default)]
    pub sources: Option<Vec<RawSource>>,
    #[serde(default)]
    pub teams: Option<RawTeams>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeams {
    #[serde(default)]
    pub home: Option<RawTeam>,
    #[serde(default)]
    pub away: Option<RawTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
}

impl RawMatch {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    /// Start time in epoch ms. Zero, negative and unparseable dates count as missing.
    pub fn timestamp(&self) -> Option<i64> {
        let ts = match self.date.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    chrono::DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|dt| dt.timestamp_millis())
                })
            }
            _ => None,
        }?;
        (ts > 0).then_some(ts)
    }
}

impl RawTeam {
    pub fn score(&self) -> Option<u32> {
        match self.score.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `true`/`false`, `1`/`0` or `"true"`/`"1"`; anything else reads as absent.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Decode a feed body. Non-arrays yield no records; malformed entries are skipped.
pub fn parse_matches(body: Value) -> Vec<RawMatch> {
    let Value::Array(items) = body else {
        return Vec::new();
    };
    let total = items.len();
    let records: Vec<RawMatch> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if records.len() < total {
        debug!(skipped = total - records.len(), "skipped malformed match records");
    }
    records
}

// ── Feed ────────────────────────────────────────────────────────

/// Both snapshots fetched for one request.
#[derive(Debug, Clone, Default)]
pub struct MatchSnapshot {
    pub live: Vec<RawMatch>,
    pub all: Vec<RawMatch>,
    /// Base that served the live snapshot
    pub base: Option<String>,
}

pub struct MatchFeed {
    fetch: Arc<dyn JsonFetch>,
    bases: Vec<String>,
}

impl MatchFeed {
    pub fn new(fetch: Arc<dyn JsonFetch>, bases: Vec<String>) -> Self {
        Self { fetch, bases }
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Try each base in order; the first that answers wins, even with a non-array body.
    pub async fn fetch_matches(&self, endpoint: &str) -> Result<(Vec<RawMatch>, String), UpstreamError> {
        let mut last_error = None;
        for base in &self.bases {
            let url = format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'));
            match self.fetch.fetch_json(&url).await {
                Ok(body) => return Ok((parse_matches(body), base.clone())),
                Err(err) => {
                    warn!(endpoint, base = %base, error = %err, "match feed base failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            UpstreamError::transient(endpoint, "no stream api bases configured")
        }))
    }

    /// Live snapshot first, then all; the second request waits for the first to settle.
    pub async fn fetch_snapshot(&self) -> Result<MatchSnapshot, UpstreamError> {
        let (live, live_base) = self.fetch_matches("/matches/live").await?;
        let (all, _) = self.fetch_matches("/matches/all").await?;
        Ok(MatchSnapshot {
            live,
            all,
            base: Some(live_base),
        })
    }
}

// ── Images ──────────────────────────────────────────────────────

const IMAGE_EXTENSIONS: [&str; 5] = [".webp", ".png", ".jpg", ".jpeg", ".svg"];

fn has_image_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn has_extension(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .map(|file| file.contains('.'))
        .unwrap_or(false)
}

/// Resolves feed badge/poster references to absolute image URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: String,
}

impl ImageResolver {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn badge_url(&self, badge: Option<&str>) -> Option<String> {
        let cleaned = badge?.trim();
        if cleaned.is_empty() {
            return None;
        }
        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Some(cleaned.to_string());
        }
        if cleaned.starts_with('/') {
            return Some(format!("{}{}", self.base, cleaned));
        }
        if cleaned.starts_with("api/images/") || cleaned.starts_with("images/") {
            return Some(format!("{}/{}", self.base, cleaned));
        }
        if has_image_extension(cleaned) {
            return Some(format!("{}/api/images/badge/{}", self.base, cleaned));
        }
        Some(format!("{}/api/images/badge/{}.webp", self.base, cleaned))
    }

    pub fn poster_url(&self, poster: Option<&str>) -> Option<String> {
        let cleaned = poster?.trim();
        if cleaned.is_empty() {
            return None;
        }
        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Some(cleaned.to_string());
        }
        if cleaned.starts_with('/') || cleaned.starts_with("api/images/") || cleaned.starts_with("images/") {
            let mut path = format!("/{}", cleaned.trim_start_matches('/'));
            if !has_extension(&path) {
                path.push_str(".webp");
            }
            return Some(format!("{}{}", self.base, path));
        }
        if has_image_extension(cleaned) {
            return Some(format!("{}/api/images/proxy/{}", self.base, cleaned));
        }
        Some(format!("{}/api/images/proxy/{}.webp", self.base, cleaned))
    }
}
