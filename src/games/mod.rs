//! Game assembly: classification, building, dedupe, ordering, score overlay, event lookup
//! and source health.

pub mod builder;
pub mod classifier;
pub mod dedupe;
pub mod event_match;
pub mod fallback;
pub mod health;
pub mod ordering;
pub mod overlay;

pub use builder::{filter_games, find_by_slug, BuildOutcome, GameBuilder, Liveness};
pub use classifier::LeagueClassifier;
pub use dedupe::{dedupe_games, dedupe_key};
pub use event_match::{find_event, Matchup};
pub use fallback::games_from_scoreboard;
pub use health::HealthProbe;
pub use ordering::{sort_games, sort_sources};
pub use overlay::{apply_overlay, ScoreboardIndex};

use serde::{Deserialize, Serialize};

use crate::domain::Game;

// =============================================================================
// Request parameters
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameFilter {
    #[default]
    All,
    Live,
    Upcoming,
}

impl GameFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Live => "live",
            Self::Upcoming => "upcoming",
        }
    }

    /// Unrecognized values fall back to `all`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("live") => Self::Live,
            Some("upcoming") => Self::Upcoming,
            _ => Self::All,
        }
    }
}

impl std::fmt::Display for GameFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Cached build result
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Streamed,
    EspnScoreboard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCounts {
    pub live: usize,
    pub all: usize,
}

/// Counters reported under `meta.debug`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    pub live_raw: usize,
    pub all_raw: usize,
    /// Scheduled records dropped because the same id is listed live
    pub live_overlap: usize,
    /// Records no league rule accepted
    pub unmatched: usize,
    pub matched: usize,
    /// Games collapsed by the dedupe key
    pub duplicates: usize,
}

/// What the games cache stores for one `(league, filter, health)` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamesSnapshot {
    pub games: Vec<Game>,
    pub upstream_base: Option<String>,
    pub source_type: SourceType,
    pub upstream_counts: Option<UpstreamCounts>,
    pub stats: Option<BuildStats>,
    pub warning: Option<String>,
}
