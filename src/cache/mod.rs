//! Per-endpoint response caches and the clock they age against.

pub mod clock;
pub mod response;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use response::{CacheEntry, Cached, ResponseCache, UPSTREAM_UNAVAILABLE};

use std::sync::Arc;

use crate::adapters::espn::{AthleteStats, GameSummary, Playoffs, Standings};
use crate::config::CacheTtls;
use crate::domain::{SourceHealth, Team};
use crate::games::GamesSnapshot;
use crate::players::{LeadersTable, RosterIndex};

/// Every cache the gateway owns, one per endpoint concern.
pub struct Caches {
    pub games: ResponseCache<GamesSnapshot>,
    pub teams: ResponseCache<Vec<Team>>,
    pub standings: ResponseCache<Standings>,
    pub playoffs: ResponseCache<Playoffs>,
    /// Keyed by `league:event_id`
    pub stats: ResponseCache<GameSummary>,
    pub roster_index: ResponseCache<RosterIndex>,
    pub team_list: ResponseCache<Vec<Team>>,
    pub athlete_stats: ResponseCache<AthleteStats>,
    pub seasons: ResponseCache<i32>,
    pub leaders: ResponseCache<LeadersTable>,
    pub source_health: Arc<ResponseCache<SourceHealth>>,
}

impl Caches {
    /// Build the full cache set against one clock.
    pub fn new(ttls: &CacheTtls, clock: SharedClock) -> Self {
        Self {
            games: ResponseCache::new("games", ttls.games, clock.clone()),
            teams: ResponseCache::new("teams", ttls.teams, clock.clone()),
            standings: ResponseCache::new("standings", ttls.standings, clock.clone()),
            playoffs: ResponseCache::new("playoffs", ttls.playoffs, clock.clone()),
            stats: ResponseCache::new("stats", ttls.stats, clock.clone()),
            roster_index: ResponseCache::new("roster_index", ttls.roster_index, clock.clone()),
            team_list: ResponseCache::new("team_list", ttls.team_list, clock.clone()),
            athlete_stats: ResponseCache::new("athlete_stats", ttls.athlete_stats, clock.clone()),
            seasons: ResponseCache::new("seasons", ttls.seasons, clock.clone()),
            leaders: ResponseCache::new("leaders", ttls.leaders, clock.clone()),
            source_health: Arc::new(ResponseCache::new(
                "source_health",
                ttls.source_health,
                clock,
            )),
        }
    }
}
