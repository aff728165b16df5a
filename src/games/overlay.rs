//! Live score overlay: splice ESPN scoreboard scores into live streamed games.

use std::collections::HashMap;

use crate::adapters::espn::{Competitor, Scoreboard};
use crate::domain::{join_name, Game, GameTeam, LeagueKey, TeamDirectory};

#[derive(Debug, Clone, PartialEq)]
struct ScoreLine {
    sides: [(String, Option<u32>); 2],
}

impl ScoreLine {
    fn score_for(&self, key: &str) -> Option<Option<u32>> {
        self.sides.iter().find(|(k, _)| k == key).map(|(_, score)| *score)
    }
}

fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// Scoreboard events keyed by team pair, orientation-free.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardIndex {
    by_abbreviation: HashMap<String, ScoreLine>,
    by_name: HashMap<String, ScoreLine>,
}

impl ScoreboardIndex {
    /// Later events with an already-indexed pair are ignored.
    pub fn new(scoreboard: &Scoreboard) -> Self {
        let mut index = Self::default();
        for event in &scoreboard.events {
            let (Some(away), Some(home)) = (&event.away, &event.home) else {
                continue;
            };
            let abbr = |c: &Competitor| c.abbreviation.as_deref().map(str::to_uppercase).filter(|a| !a.is_empty());
            if let (Some(a), Some(h)) = (abbr(away), abbr(home)) {
                index
                    .by_abbreviation
                    .entry(pair_key(&a, &h))
                    .or_insert(ScoreLine {
                        sides: [(a, away.score), (h, home.score)],
                    });
            }
            let (a, h) = (join_name(&away.name), join_name(&home.name));
            if !a.is_empty() && !h.is_empty() {
                index.by_name.entry(pair_key(&a, &h)).or_insert(ScoreLine {
                    sides: [(a, away.score), (h, home.score)],
                });
            }
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.by_abbreviation.is_empty() && self.by_name.is_empty()
    }

    fn lookup(map: &HashMap<String, ScoreLine>, away: &str, home: &str) -> Option<(Option<u32>, Option<u32>)> {
        let line = map.get(&pair_key(away, home))?;
        Some((line.score_for(away)?, line.score_for(home)?))
    }

    /// Abbreviations first when both sides have one, then normalized names.
    fn scores(&self, away: &GameTeam, home: &GameTeam, directory: &TeamDirectory) -> Option<(Option<u32>, Option<u32>)> {
        let abbr = |team: &GameTeam| {
            team.abbreviation
                .clone()
                .or_else(|| directory.abbreviation(&team.name).map(str::to_string))
                .map(|a| a.to_uppercase())
        };
        if let (Some(a), Some(h)) = (abbr(away), abbr(home)) {
            if let Some(hit) = Self::lookup(&self.by_abbreviation, &a, &h) {
                return Some(hit);
            }
        }
        let (a, h) = (join_name(&away.name), join_name(&home.name));
        if a.is_empty() || h.is_empty() {
            return None;
        }
        Self::lookup(&self.by_name, &a, &h)
    }
}

/// Returns a new list in which live `league` games matched on the scoreboard carry its scores.
/// Unmatched games keep whatever score they had.
pub fn apply_overlay(games: Vec<Game>, league: LeagueKey, index: &ScoreboardIndex, directory: &TeamDirectory) -> Vec<Game> {
    if index.is_empty() {
        return games;
    }
    games
        .into_iter()
        .map(|game| {
            if !game.is_live || game.league != league {
                return game;
            }
            let scores = match (game.away(), game.home()) {
                (Some(away), Some(home)) => index.scores(away, home, directory),
                _ => None,
            };
            let Some((away_score, home_score)) = scores else {
                return game;
            };
            let mut patched = game;
            if let Some(teams) = patched.teams.as_mut() {
                if let Some(team) = teams.away.as_mut() {
                    team.score = away_score.or(team.score);
                }
                if let Some(team) = teams.home.as_mut() {
                    team.score = home_score.or(team.score);
                }
            }
            patched
        })
        .collect()
}
