//! ESPN public APIs: scoreboard, game summaries, teams, standings, rosters and athlete statistics.
//!
//! Read-only and keyless. Every call goes through the shared [`JsonFetch`] so retries and
//! timeouts are uniform with the match feed.

pub mod athlete_stats;
pub mod roster;
pub mod scoreboard;
pub mod standings;
pub mod summary;
pub mod teams;

pub use athlete_stats::{AthleteStats, StatCategory, StatValue};
pub use roster::{RosterAthlete, TeamRoster};
pub use scoreboard::{
    build_playoffs, Competitor, EventStatus, PlayoffRound, Playoffs, Scoreboard, ScoreboardEvent,
};
pub use standings::{Standings, StandingsEntry, StandingsGroup, StandingsStats, StandingsTeam};
pub use summary::GameSummary;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::http_client::JsonFetch;
use crate::config::AppConfig;
use crate::domain::{LeagueKey, Team};
use crate::error::UpstreamError;

type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

// ── Shared wire helpers ─────────────────────────────────────────

/// ESPN ids arrive as strings or numbers depending on the endpoint.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Scores are `"24"`, `24`, or `{ "value": 24.0, "displayValue": "24" }`.
pub(crate) fn parse_score(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(obj) => obj
            .get("value")
            .and_then(parse_score)
            .or_else(|| obj.get("displayValue").and_then(parse_score)),
        _ => None,
    }
}

// ── Client ──────────────────────────────────────────────────────

pub struct EspnApi {
    fetch: Arc<dyn JsonFetch>,
    site_base: String,
    core_base: String,
}

impl EspnApi {
    pub fn new(fetch: Arc<dyn JsonFetch>, site_base: impl Into<String>, core_base: impl Into<String>) -> Self {
        Self {
            fetch,
            site_base: site_base.into().trim_end_matches('/').to_string(),
            core_base: core_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(fetch: Arc<dyn JsonFetch>, cfg: &AppConfig) -> Self {
        Self::new(fetch, &cfg.espn_site_api_base, &cfg.espn_core_api_base)
    }

    fn site_url(&self, league: LeagueKey, tail: &str) -> String {
        format!(
            "{}/apis/site/v2/sports/{}/{}/{}",
            self.site_base,
            league.sport(),
            league.as_str(),
            tail
        )
    }

    pub fn scoreboard_url(&self, league: LeagueKey) -> String {
        self.site_url(league, "scoreboard")
    }

    /// Scoreboard for one day, `date` as `YYYYMMDD`.
    pub fn scoreboard_on_url(&self, league: LeagueKey, date: &str) -> String {
        format!("{}?dates={}", self.scoreboard_url(league), urlencoding::encode(date))
    }

    pub fn summary_url(&self, league: LeagueKey, event_id: &str) -> String {
        format!("{}?event={}", self.site_url(league, "summary"), urlencoding::encode(event_id))
    }

    pub fn postseason_url(&self, league: LeagueKey, year: i32) -> String {
        format!(
            "{}?seasontype={}&dates={}",
            self.scoreboard_url(league),
            scoreboard::POSTSEASON,
            year
        )
    }

    pub fn teams_url(&self, league: LeagueKey) -> String {
        self.site_url(league, "teams")
    }

    pub fn standings_url(&self, league: LeagueKey, season: Option<i32>) -> String {
        let mut url = format!(
            "{}/apis/v2/sports/{}/{}/standings",
            self.site_base,
            league.sport(),
            league.as_str()
        );
        if let Some(season) = season {
            url.push_str(&format!("?season={season}"));
        }
        url
    }

    pub fn roster_url(&self, league: LeagueKey, team_id: &str, season: Option<i32>) -> String {
        let mut url = self.site_url(
            league,
            &format!("teams/{}/roster", urlencoding::encode(team_id)),
        );
        if let Some(season) = season {
            url.push_str(&format!("?season={season}"));
        }
        url
    }

    pub fn athlete_stats_url(&self, league: LeagueKey, season: i32, athlete_id: &str) -> String {
        format!(
            "{}/v2/sports/{}/leagues/{}/seasons/{}/types/2/athletes/{}/statistics",
            self.core_base,
            league.sport(),
            league.as_str(),
            season,
            urlencoding::encode(athlete_id)
        )
    }

    pub async fn scoreboard(&self, league: LeagueKey) -> UpstreamResult<Scoreboard> {
        let url = self.scoreboard_url(league);
        let body = self.fetch.fetch_json(&url).await?;
        scoreboard::parse_scoreboard(&url, body)
    }

    pub async fn scoreboard_on(&self, league: LeagueKey, date: &str) -> UpstreamResult<Scoreboard> {
        let url = self.scoreboard_on_url(league, date);
        let body = self.fetch.fetch_json(&url).await?;
        scoreboard::parse_scoreboard(&url, body)
    }

    pub async fn summary(&self, league: LeagueKey, event_id: &str) -> UpstreamResult<GameSummary> {
        let url = self.summary_url(league, event_id);
        let body = self.fetch.fetch_json(&url).await?;
        let summary = summary::parse_summary(&url, body)?;
        debug!(league = %league, event_id, "loaded espn summary");
        Ok(summary)
    }

    pub async fn postseason_scoreboard(&self, league: LeagueKey, year: i32) -> UpstreamResult<Scoreboard> {
        let url = self.postseason_url(league, year);
        let body = self.fetch.fetch_json(&url).await?;
        scoreboard::parse_scoreboard(&url, body)
    }

    pub async fn teams(&self, league: LeagueKey) -> UpstreamResult<Vec<Team>> {
        let url = self.teams_url(league);
        let body = self.fetch.fetch_json(&url).await?;
        let teams = teams::parse_teams(&url, body, league)?;
        debug!(league = %league, count = teams.len(), "loaded espn teams");
        Ok(teams)
    }

    pub async fn standings(&self, league: LeagueKey, season: Option<i32>) -> UpstreamResult<Standings> {
        let url = self.standings_url(league, season);
        let body = self.fetch.fetch_json(&url).await?;
        standings::parse_standings(&url, body, league)
    }

    pub async fn roster(&self, league: LeagueKey, team_id: &str, season: Option<i32>) -> UpstreamResult<TeamRoster> {
        let url = self.roster_url(league, team_id, season);
        let body = self.fetch.fetch_json(&url).await?;
        roster::parse_roster(&url, body)
    }

    /// Regular-season statistics. A 404 means the athlete has none yet.
    pub async fn athlete_stats(&self, league: LeagueKey, season: i32, athlete_id: &str) -> UpstreamResult<AthleteStats> {
        let url = self.athlete_stats_url(league, season, athlete_id);
        match self.fetch.fetch_json(&url).await {
            Ok(body) => Ok(athlete_stats::parse_athlete_stats(body)),
            Err(err) if err.is_not_found() => Ok(AthleteStats::default()),
            Err(err) => Err(err),
        }
    }
}
