//! Games synthesized from an ESPN scoreboard when the streamed feed has nothing for a league.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::builder::iso_from_ms;
use crate::adapters::espn::{Competitor, Scoreboard, ScoreboardEvent};
use crate::domain::{sanitize_slug, Game, GameSource, GameTeam, GameTeams, LeagueKey};

/// ESPN dates come as full RFC 3339 or the short `2025-01-12T18:00Z` form.
pub fn parse_espn_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis())
}

fn team(competitor: &Competitor) -> GameTeam {
    GameTeam {
        name: competitor.name.clone(),
        logo: competitor.logo.clone(),
        score: competitor.score,
        abbreviation: competitor.abbreviation.clone(),
    }
}

pub fn event_to_game(event: &ScoreboardEvent, league: LeagueKey) -> Game {
    let away = event.away.as_ref().map(team);
    let home = event.home.as_ref().map(team);
    let title = match (&away, &home) {
        (Some(a), Some(h)) if !a.name.is_empty() && !h.name.is_empty() => format!("{} vs {}", a.name, h.name),
        _ => event.name.clone(),
    };
    let timestamp = event.start_date.as_deref().and_then(parse_espn_date);
    let state = event.status.state.as_str();
    let is_live = state == "in";
    let is_ended = state == "post" || event.status.completed;

    Game {
        id: format!("espn_{}", event.id),
        match_id: event.id.clone(),
        slug: sanitize_slug(&event.id),
        title,
        poster: None,
        category: league.sport().to_string(),
        sport: league.sport().to_string(),
        game_time: timestamp.and_then(iso_from_ms),
        timestamp,
        is_live,
        is_upcoming: !is_live && !is_ended && state == "pre",
        is_ended: !is_live && is_ended,
        is_popular: false,
        sources: vec![GameSource::new("admin", event.id.clone())],
        current_source: "admin".to_string(),
        source: "espn".to_string(),
        league,
        teams: (away.is_some() || home.is_some()).then_some(GameTeams { home, away }),
    }
}

pub fn games_from_scoreboard(scoreboard: &Scoreboard, league: LeagueKey) -> Vec<Game> {
    scoreboard
        .events
        .iter()
        .map(|event| event_to_game(event, league))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::espn::EventStatus;

    fn event(state: &str, completed: bool) -> ScoreboardEvent {
        ScoreboardEvent {
            id: "401547".into(),
            name: "Buffalo Bills at New York Jets".into(),
            short_name: "BUF @ NYJ".into(),
            start_date: Some("2025-10-09T17:00Z".into()),
            week: Some(6),
            status: EventStatus {
                state: state.into(),
                completed,
                detail: None,
            },
            home: Some(Competitor {
                name: "New York Jets".into(),
                abbreviation: Some("NYJ".into()),
                score: Some(10),
                ..Competitor::default()
            }),
            away: Some(Competitor {
                name: "Buffalo Bills".into(),
                abbreviation: Some("BUF".into()),
                score: Some(14),
                ..Competitor::default()
            }),
        }
    }

    #[test]
    fn test_event_to_game() {
        let game = event_to_game(&event("in", false), LeagueKey::Nfl);
        assert_eq!(game.id, "espn_401547");
        assert_eq!(game.title, "Buffalo Bills vs New York Jets");
        assert!(game.is_live && !game.is_upcoming && !game.is_ended);
        assert_eq!(game.source, "espn");
        assert_eq!(game.away().unwrap().score, Some(14));
        assert_eq!(game.home().unwrap().abbreviation.as_deref(), Some("NYJ"));
        assert_eq!(game.game_time.as_deref(), Some("2025-10-09T17:00:00.000Z"));
    }

    #[test]
    fn test_state_flags() {
        let pre = event_to_game(&event("pre", false), LeagueKey::Nfl);
        assert!(pre.is_upcoming && !pre.is_live && !pre.is_ended);
        let post = event_to_game(&event("post", true), LeagueKey::Nfl);
        assert!(post.is_ended && !post.is_upcoming);
    }

    #[test]
    fn test_parse_espn_date_forms() {
        assert_eq!(parse_espn_date("2025-10-09T17:00Z"), parse_espn_date("2025-10-09T17:00:00Z"));
        assert!(parse_espn_date("2025-10-09T17:00:00.000+00:00").is_some());
        assert_eq!(parse_espn_date("soon"), None);
    }
}
