//! Player tables: schemas, the league roster index, and paginated or ranked stat tables.

pub mod index;
pub mod schema;
pub mod table;

pub use index::{build_roster_index, PlayerTeam, RosterIndex, RosterPlayer};
pub use schema::{extract_stat_value, ColumnHeader, SchemaTable, StatColumn, StatsMode, TableSchema, TableView};
pub use table::{build_row, rank_leaders, LeadersTable, Page, PlayerRow, PlayerTable};

use chrono::{Datelike, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::espn::{AthleteStats, EspnApi};
use crate::cache::{Cached, Caches, SharedClock};
use crate::coordination::bounded_map;
use crate::domain::{LeagueKey, Team};
use crate::error::UpstreamError;

/// Warning attached when some athletes' statistics failed to load.
pub const PARTIAL_STATS: &str = "partial_stats";

/// Season parameter: only a four-digit year counts.
pub fn parse_season(value: Option<&str>) -> Option<i32> {
    let value = value?.trim();
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

/// Roster, season and statistics lookups behind `/players` and `/leaders`.
pub struct PlayerDirectory {
    espn: Arc<EspnApi>,
    caches: Arc<Caches>,
    clock: SharedClock,
    concurrency: usize,
}

impl PlayerDirectory {
    pub fn new(espn: Arc<EspnApi>, caches: Arc<Caches>, clock: SharedClock, concurrency: usize) -> Self {
        Self {
            espn,
            caches,
            clock,
            concurrency: concurrency.max(1),
        }
    }

    fn current_year(&self) -> i32 {
        Utc.timestamp_millis_opt(self.clock.now_ms())
            .single()
            .map(|dt| dt.year())
            .unwrap_or(1970)
    }

    pub async fn team_list(&self, league: LeagueKey, force: bool) -> Result<Cached<Vec<Team>>, UpstreamError> {
        self.caches
            .team_list
            .get_or_fetch(league.as_str(), force, || self.espn.teams(league))
            .await
    }

    /// The requested season, else the season the league's first roster reports, else the
    /// current calendar year.
    pub async fn resolve_season(&self, league: LeagueKey, requested: Option<i32>, force: bool) -> i32 {
        if let Some(season) = requested {
            return season;
        }
        let sampled = self
            .caches
            .seasons
            .get_or_fetch(league.as_str(), force, || async {
                let teams = self.team_list(league, force).await?.value;
                let first = teams
                    .iter()
                    .find_map(|t| t.id.clone())
                    .ok_or_else(|| UpstreamError::invalid_payload(self.espn.teams_url(league), "no teams listed"))?;
                let roster = self.espn.roster(league, &first, None).await?;
                roster.season_year.ok_or_else(|| {
                    UpstreamError::invalid_payload(self.espn.roster_url(league, &first, None), "roster has no season")
                })
            })
            .await;
        match sampled {
            Ok(hit) => hit.value,
            Err(err) => {
                let year = self.current_year();
                warn!(league = %league, error = %err, year, "season lookup failed, using calendar year");
                year
            }
        }
    }

    pub async fn roster_index(&self, league: LeagueKey, season: i32, force: bool) -> Result<Cached<RosterIndex>, UpstreamError> {
        let key = format!("{}:{}", league.as_str(), season);
        self.caches
            .roster_index
            .get_or_fetch(&key, force, || async {
                let teams = self.team_list(league, force).await?.value;
                build_roster_index(&self.espn, league, season, &teams, self.concurrency).await
            })
            .await
    }

    /// Statistics for each player, in order. `None` marks an athlete whose fetch failed;
    /// the flag reports whether any did.
    pub async fn athlete_stats(&self, league: LeagueKey, season: i32, players: &[RosterPlayer]) -> (Vec<Option<AthleteStats>>, bool) {
        let ids: Vec<&str> = players.iter().map(|p| p.id.as_str()).collect();
        let results = bounded_map(ids, self.concurrency, |id| async move {
            let key = format!("{}:{}:{}", league.as_str(), season, id);
            let fetched = self
                .caches
                .athlete_stats
                .get_or_fetch(&key, false, || self.espn.athlete_stats(league, season, id))
                .await;
            match fetched {
                Ok(hit) => Some(hit.value),
                Err(err) => {
                    debug!(league = %league, athlete = id, error = %err, "athlete stats unavailable");
                    None
                }
            }
        })
        .await;
        let partial = results.iter().any(Option::is_none);
        (results, partial)
    }

    /// Rows for `players`, ranked from `first_rank`.
    pub async fn rows(
        &self,
        league: LeagueKey,
        season: i32,
        schema: &TableSchema,
        players: &[RosterPlayer],
        first_rank: usize,
    ) -> (Vec<PlayerRow>, bool) {
        let (stats, partial) = self.athlete_stats(league, season, players).await;
        let rows = players
            .iter()
            .zip(stats.iter())
            .enumerate()
            .map(|(i, (player, stats))| build_row(first_rank + i, player, schema, stats.as_ref()))
            .collect();
        (rows, partial)
    }
}
