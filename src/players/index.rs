//! League-wide roster index built from per-team rosters.

use serde::Serialize;
use tracing::{debug, warn};

use super::schema::StatsMode;
use crate::adapters::espn::{EspnApi, TeamRoster};
use crate::coordination::bounded_map;
use crate::domain::{LeagueKey, Team};
use crate::error::UpstreamError;

/// Positions listed on the pitching table. Everyone else is a hitter.
pub const PITCHER_POSITIONS: [&str; 4] = ["P", "SP", "RP", "CL"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTeam {
    pub id: Option<String>,
    pub abbreviation: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub id: String,
    pub display_name: Option<String>,
    pub short_name: Option<String>,
    pub headshot: Option<String>,
    pub position: Option<String>,
    pub team: PlayerTeam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSource {
    pub teams: String,
}

/// Every rostered athlete of a league for one season, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterIndex {
    pub season: i32,
    pub players: Vec<RosterPlayer>,
    pub source: IndexSource,
}

impl RosterIndex {
    /// Players shown on one table: MLB splits by pitcher positions, then an optional
    /// position filter (`all` or empty means no filter).
    pub fn select(&self, league: LeagueKey, mode: StatsMode, position: Option<&str>) -> Vec<RosterPlayer> {
        let position = position
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("all"));
        self.players
            .iter()
            .filter(|player| {
                if league != LeagueKey::Mlb {
                    return true;
                }
                let is_pitcher = player
                    .position
                    .as_deref()
                    .is_some_and(|p| PITCHER_POSITIONS.contains(&p));
                match mode {
                    StatsMode::Pitching => is_pitcher,
                    StatsMode::Hitting => !is_pitcher,
                }
            })
            .filter(|player| match position {
                Some(wanted) => player
                    .position
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .cloned()
            .collect()
    }
}

fn merge_roster(players: &mut Vec<RosterPlayer>, team: &Team, roster: TeamRoster) {
    for athlete in roster.athletes {
        players.push(RosterPlayer {
            id: athlete.id,
            display_name: athlete.display_name,
            short_name: athlete.short_name,
            headshot: athlete.headshot,
            position: athlete.position,
            team: PlayerTeam {
                id: team.id.clone(),
                abbreviation: team.abbreviation.clone(),
                display_name: team.name.clone(),
            },
        });
    }
}

/// Numeric ids ascending, then non-numeric ids lexically. Equal ids compare equal.
fn id_key(player: &RosterPlayer) -> (bool, u64, &str) {
    match player.id.parse::<u64>() {
        Ok(n) => (false, n, player.id.as_str()),
        Err(_) => (true, 0, player.id.as_str()),
    }
}

fn id_order(a: &RosterPlayer, b: &RosterPlayer) -> std::cmp::Ordering {
    id_key(a).cmp(&id_key(b))
}

/// Fetch every team's roster for `season` with at most `concurrency` requests in flight.
///
/// Teams whose roster fails are skipped. The build only fails when every roster fails.
pub async fn build_roster_index(
    espn: &EspnApi,
    league: LeagueKey,
    season: i32,
    teams: &[Team],
    concurrency: usize,
) -> Result<RosterIndex, UpstreamError> {
    let with_ids: Vec<&Team> = teams.iter().filter(|t| t.id.is_some()).collect();
    let results = bounded_map(with_ids.clone(), concurrency, |team| async move {
        let id = team.id.as_deref().unwrap_or_default();
        espn.roster(league, id, Some(season)).await
    })
    .await;

    let mut players = Vec::new();
    let mut last_error = None;
    let mut loaded = 0usize;
    for (team, result) in with_ids.iter().zip(results) {
        match result {
            Ok(roster) => {
                loaded += 1;
                merge_roster(&mut players, team, roster);
            }
            Err(err) => {
                warn!(league = %league, team = %team.abbreviation, error = %err, "roster fetch failed, skipping team");
                last_error = Some(err);
            }
        }
    }
    if loaded == 0 {
        if let Some(err) = last_error {
            return Err(err);
        }
    }

    players.sort_by(id_order);
    players.dedup_by(|a, b| a.id == b.id);
    debug!(league = %league, season, teams = loaded, players = players.len(), "roster index built");

    Ok(RosterIndex {
        season,
        players,
        source: IndexSource {
            teams: espn.teams_url(league),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, position: &str) -> RosterPlayer {
        RosterPlayer {
            id: id.into(),
            display_name: Some(format!("Player {id}")),
            short_name: None,
            headshot: None,
            position: Some(position.into()),
            team: PlayerTeam {
                id: Some("10".into()),
                abbreviation: "NYY".into(),
                display_name: "New York Yankees".into(),
            },
        }
    }

    fn index() -> RosterIndex {
        RosterIndex {
            season: 2025,
            players: vec![player("1", "SP"), player("2", "C"), player("3", "RP"), player("4", "SS")],
            source: IndexSource { teams: "t".into() },
        }
    }

    fn ids(players: &[RosterPlayer]) -> Vec<&str> {
        players.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_mlb_mode_splits_pitchers() {
        let idx = index();
        assert_eq!(ids(&idx.select(LeagueKey::Mlb, StatsMode::Pitching, None)), vec!["1", "3"]);
        assert_eq!(ids(&idx.select(LeagueKey::Mlb, StatsMode::Hitting, None)), vec!["2", "4"]);
        // Other leagues ignore the mode.
        assert_eq!(idx.select(LeagueKey::Nba, StatsMode::Pitching, None).len(), 4);
    }

    #[test]
    fn test_position_filter() {
        let idx = index();
        assert_eq!(ids(&idx.select(LeagueKey::Mlb, StatsMode::Hitting, Some("ss"))), vec!["4"]);
        assert_eq!(idx.select(LeagueKey::Mlb, StatsMode::Hitting, Some("All")).len(), 2);
        assert!(idx.select(LeagueKey::Mlb, StatsMode::Pitching, Some("C")).is_empty());
    }

    #[test]
    fn test_id_order_is_numeric() {
        let mut players = vec![player("100", "C"), player("20", "C"), player("3", "C")];
        players.sort_by(id_order);
        assert_eq!(ids(&players), vec!["3", "20", "100"]);
    }

    #[test]
    fn test_mixed_ids_sort_totally_and_dedupe() {
        let mut players = vec![
            player("2", "C"),
            player("1a", "C"),
            player("10", "C"),
            player("2", "SS"),
            player("1a", "SS"),
            player("b", "C"),
        ];
        players.sort_by(id_order);
        players.dedup_by(|a, b| a.id == b.id);
        assert_eq!(ids(&players), vec!["2", "10", "1a", "b"]);
    }
}
