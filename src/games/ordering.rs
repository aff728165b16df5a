//! Ordering of games and of stream sources within a game.

use std::cmp::Ordering;

use crate::domain::{Game, GameSource, HealthStatus, LeagueScope};

/// Stream providers in order of preference; anything else sorts after them.
pub const SOURCE_PREFERENCE: [&str; 7] = ["admin", "delta", "charlie", "echo", "golf", "alpha", "bravo"];

fn preference(name: &str) -> usize {
    SOURCE_PREFERENCE
        .iter()
        .position(|p| *p == name)
        .unwrap_or(SOURCE_PREFERENCE.len())
}

fn health_rank(source: &GameSource) -> u8 {
    source
        .health
        .as_ref()
        .map(|h| h.status.rank())
        .unwrap_or(HealthStatus::Unknown.rank())
}

/// Healthy first, then by provider preference. Stable for equal ranks.
pub fn sort_sources(sources: &mut [GameSource]) {
    sources.sort_by_key(|s| (health_rank(s), preference(&s.source)));
}

/// Ascending start time (undated last), live before not live, then league priority when
/// listing every league, then id so the order is total.
pub fn compare_games(a: &Game, b: &Game, scope: LeagueScope) -> Ordering {
    let by_time = match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time
        .then_with(|| b.is_live.cmp(&a.is_live))
        .then_with(|| match scope {
            LeagueScope::All => a.league.priority().cmp(&b.league.priority()),
            LeagueScope::League(_) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_games(games: &mut [Game], scope: LeagueScope) {
    games.sort_by(|a, b| compare_games(a, b, scope));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LeagueKey, SourceHealth};

    fn game(id: &str, ts: Option<i64>, live: bool, league: LeagueKey) -> Game {
        Game {
            id: id.into(),
            match_id: id.into(),
            slug: id.into(),
            title: id.into(),
            poster: None,
            category: String::new(),
            sport: String::new(),
            game_time: None,
            timestamp: ts,
            is_live: live,
            is_upcoming: false,
            is_ended: false,
            is_popular: false,
            sources: vec![GameSource::new("admin", id)],
            current_source: "admin".into(),
            source: "api".into(),
            league,
            teams: None,
        }
    }

    fn ids(games: &[Game]) -> Vec<&str> {
        games.iter().map(|g| g.id.as_str()).collect()
    }

    #[test]
    fn test_sort_is_permutation_independent() {
        let base = vec![
            game("d", None, false, LeagueKey::Nfl),
            game("c", Some(200), false, LeagueKey::Nhl),
            game("b", Some(100), false, LeagueKey::Nba),
            game("a", Some(100), true, LeagueKey::Mlb),
            game("e", Some(200), false, LeagueKey::Nfl),
        ];
        let mut forward = base.clone();
        let mut reversed: Vec<Game> = base.into_iter().rev().collect();
        sort_games(&mut forward, LeagueScope::All);
        sort_games(&mut reversed, LeagueScope::All);
        assert_eq!(ids(&forward), vec!["a", "b", "e", "c", "d"]);
        assert_eq!(ids(&forward), ids(&reversed));
    }

    #[test]
    fn test_league_scope_ignores_priority() {
        let mut games = vec![
            game("z", Some(5), false, LeagueKey::Nfl),
            game("y", Some(5), false, LeagueKey::Nfl),
        ];
        sort_games(&mut games, LeagueScope::League(LeagueKey::Nfl));
        assert_eq!(ids(&games), vec!["y", "z"]);
    }

    #[test]
    fn test_sources_by_health_then_preference() {
        let mut up = GameSource::new("bravo", "1");
        up.health = Some(SourceHealth {
            status: HealthStatus::Up,
            http_status: Some(200),
            latency_ms: Some(10),
            checked_at: None,
            error: None,
        });
        let mut down = GameSource::new("admin", "2");
        down.health = Some(SourceHealth {
            status: HealthStatus::Down,
            ..up.health.clone().unwrap()
        });
        let mut sources = vec![
            GameSource::new("mystery", "3"),
            down,
            GameSource::new("charlie", "4"),
            up,
        ];
        sort_sources(&mut sources);
        let names: Vec<&str> = sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["bravo", "charlie", "mystery", "admin"]);
    }
}
