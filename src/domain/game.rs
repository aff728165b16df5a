use serde::{Deserialize, Serialize};

use super::league::LeagueKey;

/// A normalized game record as served by `/games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub match_id: String,
    pub slug: String,
    pub title: String,
    pub poster: Option<String>,
    pub category: String,
    pub sport: String,
    /// ISO-8601 start time, `None` when the upstream gave no date
    pub game_time: Option<String>,
    /// Start time in epoch milliseconds
    pub timestamp: Option<i64>,
    pub is_live: bool,
    pub is_upcoming: bool,
    pub is_ended: bool,
    pub is_popular: bool,
    pub sources: Vec<GameSource>,
    pub current_source: String,
    /// `api` for streamed-feed games, `espn` for scoreboard fallbacks
    pub source: String,
    pub league: LeagueKey,
    pub teams: Option<GameTeams>,
}

impl Game {
    pub fn away(&self) -> Option<&GameTeam> {
        self.teams.as_ref().and_then(|t| t.away.as_ref())
    }

    pub fn home(&self) -> Option<&GameTeam> {
        self.teams.as_ref().and_then(|t| t.home.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSource {
    pub source: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<SourceHealth>,
}

impl GameSource {
    pub fn new(source: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
            health: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTeams {
    pub home: Option<GameTeam>,
    pub away: Option<GameTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTeam {
    pub name: String,
    pub logo: Option<String>,
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

impl GameTeam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Unknown,
    Down,
}

impl HealthStatus {
    /// Sort rank: healthy sources first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Unknown => 1,
            Self::Down => 2,
        }
    }

    /// 401/403 say nothing about availability, so they map to unknown.
    pub fn from_http_status(status: Option<u16>) -> Self {
        match status {
            None => Self::Unknown,
            Some(code) if code < 400 => Self::Up,
            Some(401) | Some(403) => Self::Unknown,
            Some(_) => Self::Down,
        }
    }
}

/// Result of probing one stream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub status: HealthStatus,
    pub http_status: Option<u16>,
    pub latency_ms: Option<u64>,
    pub checked_at: Option<String>,
    pub error: Option<String>,
}

impl SourceHealth {
    pub fn unknown(error: &str) -> Self {
        Self {
            status: HealthStatus::Unknown,
            http_status: None,
            latency_ms: None,
            checked_at: None,
            error: Some(error.to_string()),
        }
    }
}
