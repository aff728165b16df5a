//! Collapse duplicate games across the live and scheduled snapshots.

use chrono::{TimeZone, Utc};
use std::collections::HashMap;

use crate::domain::{normalize_name, split_matchup, Game, RulesTable};

/// Reduce a normalized team name to the longest league team keyword it contains as whole
/// words, so `buffalo bills` and `bills` agree.
fn canonical_team(name: &str, keywords: &[String]) -> String {
    let padded = format!(" {name} ");
    keywords
        .iter()
        .map(|k| normalize_name(k))
        .filter(|k| !k.is_empty() && padded.contains(&format!(" {k} ")))
        .max_by_key(|k| k.len())
        .unwrap_or_else(|| name.to_string())
}

fn date_part(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| Utc.timestamp_millis_opt(ts).single())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn team_pair(game: &Game) -> Option<(String, String)> {
    let from_teams: Vec<String> = [game.away(), game.home()]
        .into_iter()
        .flatten()
        .map(|t| normalize_name(&t.name))
        .filter(|n| !n.is_empty())
        .collect();
    if let [away, home] = from_teams.as_slice() {
        return Some((away.clone(), home.clone()));
    }
    let (away, home) = split_matchup(&game.title)?;
    let (away, home) = (normalize_name(&away), normalize_name(&home));
    (!away.is_empty() && !home.is_empty()).then_some((away, home))
}

/// `{league}:{date}:{teamA-teamB}`, else `{league}:{date}:{title}`. Games with neither get
/// a key of their own built from `index`.
pub fn dedupe_key(game: &Game, rules: &RulesTable, index: usize) -> String {
    let league = game.league.as_str();
    let date = date_part(game.timestamp);

    if let Some((a, b)) = team_pair(game) {
        let keywords = rules.team_keywords(game.league);
        let mut pair = [canonical_team(&a, keywords), canonical_team(&b, keywords)];
        pair.sort();
        return format!("{league}:{date}:{}-{}", pair[0], pair[1]);
    }

    let title = normalize_name(&game.title);
    if !title.is_empty() {
        return format!("{league}:{date}:{title}");
    }
    format!("{league}:{date}:#{index}")
}

fn prefer(candidate: &Game, existing: &Game) -> bool {
    if candidate.is_live != existing.is_live {
        return candidate.is_live;
    }
    candidate.sources.len() > existing.sources.len()
}

/// First occurrence keeps its position; a better duplicate replaces it in place.
pub fn dedupe_games(games: Vec<Game>, rules: &RulesTable) -> Vec<Game> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(games.len());
    let mut out: Vec<Game> = Vec::with_capacity(games.len());

    for (index, game) in games.into_iter().enumerate() {
        let key = dedupe_key(&game, rules, index);
        match positions.get(&key) {
            Some(&pos) => {
                if prefer(&game, &out[pos]) {
                    out[pos] = game;
                }
            }
            None => {
                positions.insert(key, out.len());
                out.push(game);
            }
        }
    }
    out
}
