//! ESPN site scoreboard: events, competitor scores, season type and postseason calendar.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{lenient_id, parse_score};
use crate::error::UpstreamError;

/// ESPN season type for the postseason.
pub const POSTSEASON: u8 = 3;

// ── Public types ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    pub season_type: Option<u8>,
    pub season_year: Option<i32>,
    pub events: Vec<ScoreboardEvent>,
    /// Postseason round labels keyed by week number
    pub postseason_rounds: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardEvent {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub start_date: Option<String>,
    #[serde(skip)]
    pub week: Option<u32>,
    pub status: EventStatus,
    pub home: Option<Competitor>,
    pub away: Option<Competitor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct EventStatus {
    /// `pre`, `in` or `post`
    pub state: String,
    pub completed: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: Option<String>,
    pub abbreviation: Option<String>,
    pub name: String,
    pub short_name: Option<String>,
    pub logo: Option<String>,
    pub score: Option<u32>,
}

/// `/playoffs` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playoffs {
    pub is_playoffs: bool,
    pub season: Option<i32>,
    pub rounds: Vec<PlayoffRound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct PlayoffRound {
    pub number: u32,
    pub label: String,
    pub matchups: Vec<ScoreboardEvent>,
}

// ── ESPN JSON deserialization structs ────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct WireScoreboard {
    #[serde(default)]
    leagues: Vec<WireLeague>,
    #[serde(default)]
    season: Option<Value>,
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLeague {
    #[serde(default)]
    season: Option<Value>,
    #[serde(default)]
    calendar: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    week: Option<WireWeek>,
    #[serde(default)]
    competitions: Vec<WireCompetition>,
    #[serde(default)]
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireWeek {
    #[serde(default)]
    number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireCompetition {
    #[serde(default)]
    competitors: Vec<WireCompetitor>,
    #[serde(default)]
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireCompetitor {
    #[serde(rename = "homeAway", default)]
    home_away: Option<String>,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    team: Option<WireTeam>,
}

#[derive(Debug, Deserialize)]
struct WireTeam {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "shortDisplayName", default)]
    short_display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    #[serde(rename = "type", default)]
    status_type: Option<WireStatusType>,
}

#[derive(Debug, Deserialize)]
struct WireStatusType {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(rename = "shortDetail", default)]
    short_detail: Option<String>,
}

// ── Parsing ─────────────────────────────────────────────────────

/// `season.type` is either a bare number or `{ "type": 3, "id": "3", ... }`.
fn season_type_of(season: &Value) -> Option<u8> {
    match season.get("type")? {
        Value::Number(n) => n.as_u64().map(|v| v as u8),
        Value::Object(obj) => obj
            .get("type")
            .and_then(Value::as_u64)
            .or_else(|| obj.get("id").and_then(Value::as_str).and_then(|s| s.parse().ok()))
            .map(|v| v as u8),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn season_year_of(season: &Value) -> Option<i32> {
    season.get("year").and_then(Value::as_i64).map(|y| y as i32)
}

fn postseason_rounds(calendar: &[Value]) -> BTreeMap<u32, String> {
    let mut rounds = BTreeMap::new();
    let postseason = calendar.iter().find(|entry| {
        entry
            .get("label")
            .and_then(Value::as_str)
            .map(|label| label.eq_ignore_ascii_case("postseason"))
            .unwrap_or(false)
    });
    let Some(entries) = postseason.and_then(|p| p.get("entries")).and_then(Value::as_array) else {
        return rounds;
    };
    for entry in entries {
        let number = entry.get("value").and_then(|v| match v {
            Value::String(s) => s.parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().map(|n| n as u32),
            _ => None,
        });
        let label = entry.get("label").and_then(Value::as_str);
        if let (Some(number), Some(label)) = (number, label) {
            rounds.insert(number, label.to_string());
        }
    }
    rounds
}

fn parse_competitor(wire: &WireCompetitor) -> Competitor {
    let team = wire.team.as_ref();
    let name = team
        .and_then(|t| {
            t.display_name
                .clone()
                .or_else(|| t.short_display_name.clone())
                .or_else(|| t.name.clone())
        })
        .unwrap_or_default();
    Competitor {
        id: team.and_then(|t| t.id.clone()),
        abbreviation: team
            .and_then(|t| t.abbreviation.as_ref())
            .map(|a| a.to_uppercase()),
        name,
        short_name: team.and_then(|t| t.short_display_name.clone()),
        logo: team.and_then(|t| t.logo.clone()),
        score: wire.score.as_ref().and_then(parse_score),
    }
}

fn parse_event(wire: WireEvent) -> Option<ScoreboardEvent> {
    let id = wire.id?;
    let competition = wire.competitions.first();

    let (mut home, mut away) = (None, None);
    if let Some(comp) = competition {
        for competitor in &comp.competitors {
            match competitor.home_away.as_deref() {
                Some("home") => home = Some(parse_competitor(competitor)),
                Some("away") => away = Some(parse_competitor(competitor)),
                _ => {}
            }
        }
    }

    let status_type = competition
        .and_then(|c| c.status.as_ref())
        .or(wire.status.as_ref())
        .and_then(|s| s.status_type.as_ref());
    let status = EventStatus {
        state: status_type
            .and_then(|t| t.state.clone())
            .unwrap_or_else(|| "pre".to_string()),
        completed: status_type.and_then(|t| t.completed).unwrap_or(false),
        detail: status_type.and_then(|t| t.detail.clone().or_else(|| t.short_detail.clone())),
    };

    Some(ScoreboardEvent {
        id,
        name: wire.name.unwrap_or_default(),
        short_name: wire.short_name.unwrap_or_default(),
        start_date: wire.date,
        week: wire.week.and_then(|w| w.number),
        status,
        home,
        away,
    })
}

pub fn parse_scoreboard(url: &str, body: Value) -> Result<Scoreboard, UpstreamError> {
    if !body.is_object() {
        return Err(UpstreamError::invalid_payload(url, "scoreboard is not an object"));
    }
    let wire: WireScoreboard =
        serde_json::from_value(body).map_err(|e| UpstreamError::invalid_payload(url, e.to_string()))?;

    let league = wire.leagues.first();
    let league_season = league.and_then(|l| l.season.as_ref());
    let season_type = league_season
        .and_then(season_type_of)
        .or_else(|| wire.season.as_ref().and_then(season_type_of));
    let season_year = league_season
        .and_then(season_year_of)
        .or_else(|| wire.season.as_ref().and_then(season_year_of));

    let events = wire
        .events
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<WireEvent>(raw).ok())
        .filter_map(parse_event)
        .collect();

    Ok(Scoreboard {
        season_type,
        season_year,
        events,
        postseason_rounds: league.map(|l| postseason_rounds(&l.calendar)).unwrap_or_default(),
    })
}

/// Group postseason events into rounds by week number (missing week counts as 0).
///
/// `scoreboard` decides whether the league is in its postseason; `postseason` is the wider
/// postseason listing when it could be fetched.
pub fn build_playoffs(scoreboard: &Scoreboard, postseason: Option<&Scoreboard>) -> Playoffs {
    if scoreboard.season_type != Some(POSTSEASON) {
        return Playoffs {
            is_playoffs: false,
            season: scoreboard.season_year,
            rounds: Vec::new(),
        };
    }

    let source = postseason.unwrap_or(scoreboard);
    let labels = if source.postseason_rounds.is_empty() {
        &scoreboard.postseason_rounds
    } else {
        &source.postseason_rounds
    };

    let mut grouped: BTreeMap<u32, Vec<ScoreboardEvent>> = BTreeMap::new();
    for event in &source.events {
        grouped.entry(event.week.unwrap_or(0)).or_default().push(event.clone());
    }

    let rounds = grouped
        .into_iter()
        .map(|(number, matchups)| PlayoffRound {
            number,
            label: labels
                .get(&number)
                .cloned()
                .unwrap_or_else(|| format!("Round {number}")),
            matchups,
        })
        .collect();

    Playoffs {
        is_playoffs: true,
        season: source.season_year.or(scoreboard.season_year),
        rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(season_type: u8) -> Value {
        json!({
            "leagues": [{
                "season": {"year": 2025, "type": {"id": season_type.to_string(), "type": season_type}},
                "calendar": [
                    {"label": "Regular Season", "value": "2", "entries": [{"label": "Week 1", "value": "1"}]},
                    {"label": "Postseason", "value": "3", "entries": [
                        {"label": "Wild Card", "value": "1"},
                        {"label": "Divisional Round", "value": "2"}
                    ]}
                ]
            }],
            "events": [
                {
                    "id": "401",
                    "name": "Buffalo Bills at New York Jets",
                    "shortName": "BUF @ NYJ",
                    "date": "2025-01-12T18:00Z",
                    "week": {"number": 2},
                    "competitions": [{
                        "competitors": [
                            {"homeAway": "home", "score": "17",
                             "team": {"id": "20", "abbreviation": "nyj", "displayName": "New York Jets", "shortDisplayName": "Jets"}},
                            {"homeAway": "away", "score": "24",
                             "team": {"id": "2", "abbreviation": "BUF", "displayName": "Buffalo Bills", "shortDisplayName": "Bills"}}
                        ],
                        "status": {"type": {"state": "in", "completed": false, "detail": "Q3 4:12"}}
                    }]
                },
                {
                    "id": "402",
                    "name": "Kansas City Chiefs at Houston Texans",
                    "week": {"number": 1},
                    "competitions": [{"competitors": [], "status": {"type": {"state": "post", "completed": true}}}]
                },
                {"name": "missing id"}
            ]
        })
    }

    #[test]
    fn test_parse_scoreboard() {
        let board = parse_scoreboard("u", sample(2)).unwrap();
        assert_eq!(board.season_type, Some(2));
        assert_eq!(board.season_year, Some(2025));
        assert_eq!(board.events.len(), 2);

        let game = &board.events[0];
        assert_eq!(game.status.state, "in");
        assert_eq!(game.home.as_ref().unwrap().abbreviation.as_deref(), Some("NYJ"));
        assert_eq!(game.away.as_ref().unwrap().score, Some(24));
        assert_eq!(board.postseason_rounds.get(&1).map(String::as_str), Some("Wild Card"));
    }

    #[test]
    fn test_regular_season_is_not_playoffs() {
        let board = parse_scoreboard("u", sample(2)).unwrap();
        let playoffs = build_playoffs(&board, None);
        assert!(!playoffs.is_playoffs);
        assert!(playoffs.rounds.is_empty());
    }

    #[test]
    fn test_postseason_groups_rounds_in_order() {
        let board = parse_scoreboard("u", sample(3)).unwrap();
        let playoffs = build_playoffs(&board, None);
        assert!(playoffs.is_playoffs);
        assert_eq!(playoffs.season, Some(2025));
        let numbers: Vec<u32> = playoffs.rounds.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(playoffs.rounds[0].label, "Wild Card");
        assert_eq!(playoffs.rounds[1].label, "Divisional Round");
        assert_eq!(playoffs.rounds[1].matchups[0].id, "401");
    }

    #[test]
    fn test_top_level_season_fallback() {
        let board = parse_scoreboard("u", json!({"season": {"type": 3, "year": 2024}, "events": []})).unwrap();
        assert_eq!(board.season_type, Some(3));
        assert_eq!(board.season_year, Some(2024));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(parse_scoreboard("u", json!([])).is_err());
    }
}
