use serde::{Deserialize, Serialize};

use crate::adapters::espn::{GameSummary, Playoffs, Standings};
use crate::cache::Cached;
use crate::domain::{Game, SourceHealth, Team};
use crate::games::{BuildStats, SourceType, UpstreamCounts};
use crate::players::{LeadersTable, PlayerTable, StatsMode, TableView};

/// Query flags accept `1` or `true`.
pub fn flag(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("TRUE") | Some("True")
    )
}

/// Integer query values; anything unparseable reads as absent so the caller's default applies.
pub fn number(value: &Option<String>) -> Option<i64> {
    value.as_deref()?.trim().parse().ok()
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Freshness block carried by every cached response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub cache_age_sec: u64,
    pub stale: bool,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<V> From<&Cached<V>> for CacheMeta {
    fn from(cached: &Cached<V>) -> Self {
        Self {
            cache_age_sec: cached.cache_age_sec,
            stale: cached.stale,
            from_cache: cached.from_cache,
            error: cached.error.map(str::to_string),
            warning: None,
        }
    }
}

// ============================================================================
// Games
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesQuery {
    pub filter: Option<String>,
    pub league: Option<String>,
    pub debug: Option<String>,
    pub include_health: Option<String>,
    pub force: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesMeta {
    pub count: usize,
    pub filter: String,
    pub league: String,
    pub cache_age_sec: u64,
    pub stale: bool,
    pub upstream_base: Option<String>,
    pub source_type: SourceType,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_counts: Option<UpstreamCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<BuildStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<Game>,
    pub meta: GamesMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResponse {
    pub game: Game,
    pub meta: GamesMeta,
}

// ============================================================================
// Teams / standings / playoffs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LeagueQuery {
    pub league: Option<String>,
    pub season: Option<String>,
    pub force: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsMeta {
    pub count: usize,
    pub league: String,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
    pub meta: TeamsMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub standings: Standings,
    pub meta: CacheMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayoffsResponse {
    #[serde(flatten)]
    pub playoffs: Playoffs,
    pub league: String,
    pub meta: CacheMeta,
}

// ============================================================================
// Game stats
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub league: Option<String>,
    pub away: Option<String>,
    pub home: Option<String>,
    pub abbr_away: Option<String>,
    pub abbr_home: Option<String>,
    pub date: Option<String>,
    pub force: Option<String>,
}

/// Digits of a date value, cut to `YYYYMMDD`; fewer than eight digits is no date.
pub fn scoreboard_date(value: &Option<String>) -> Option<String> {
    let digits: String = value.as_deref()?.chars().filter(char::is_ascii_digit).collect();
    (digits.len() >= 8).then(|| digits[..8].to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsMeta {
    pub source: Option<serde_json::Value>,
    pub date: Option<String>,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub event_id: String,
    pub league: String,
    #[serde(flatten)]
    pub summary: GameSummary,
    pub meta: StatsMeta,
}

// ============================================================================
// Players
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersQuery {
    pub league: Option<String>,
    pub season: Option<String>,
    pub view: Option<String>,
    pub mode: Option<String>,
    pub position: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub force: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersMeta {
    #[serde(flatten)]
    pub cache: CacheMeta,
    /// Team list the roster index was built from
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersResponse {
    pub league: String,
    pub season: i32,
    pub view: TableView,
    pub mode: Option<StatsMode>,
    pub position: Option<String>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub table: PlayerTable,
    pub meta: PlayersMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadersResponse {
    #[serde(flatten)]
    pub leaders: LeadersTable,
    pub meta: CacheMeta,
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_sec: i64,
    pub games: FeedHealth,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamCheckQuery {
    pub slug: Option<String>,
    pub source: Option<String>,
    pub stream: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamCheckResponse {
    pub slug: String,
    pub source: String,
    pub stream: u32,
    pub health: SourceHealth,
}
