mod common;

use axum::http::StatusCode;
use common::*;
use scoreline::cache::ManualClock;
use serde_json::{json, Value};
use std::sync::Arc;

fn competitor(side: &str, id: &str, abbr: &str, name: &str, short: &str) -> Value {
    json!({"homeAway": side, "score": "0",
           "team": {"id": id, "abbreviation": abbr, "displayName": name, "shortDisplayName": short}})
}

fn board(event_id: &str, away: Value, home: Value) -> Value {
    json!({
        "leagues": [{"season": {"year": 2025, "type": {"type": 2}}}],
        "events": [{
            "id": event_id,
            "name": "matchup",
            "competitions": [{
                "competitors": [home, away],
                "status": {"type": {"state": "pre", "completed": false}}
            }]
        }]
    })
}

fn bills_at_jets(event_id: &str) -> Value {
    board(
        event_id,
        competitor("away", "2", "BUF", "Buffalo Bills", "Bills"),
        competitor("home", "20", "NYJ", "New York Jets", "Jets"),
    )
}

fn summary_body() -> Value {
    json!({
        "header": {"id": "401"},
        "boxscore": {"teams": [{"team": {"abbreviation": "BUF"}}]},
        "winprobability": [{"homeWinPercentage": 0.42}],
        "meta": {"gameState": "pre"}
    })
}

#[tokio::test]
async fn matchup_by_name_returns_cached_summary() {
    let fake = FakeUpstream::new();
    fake.serve(&site_url("football", "nfl", "scoreboard"), bills_at_jets("401"));
    fake.serve(&site_url("football", "nfl", "summary?event=401"), summary_body());
    let app = app(fake.clone(), Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/stats?league=nfl&away=Bills&home=Jets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventId"], "401");
    assert_eq!(body["league"], "nfl");
    assert_eq!(body["header"], json!({"id": "401"}));
    assert_eq!(body["winProbability"], json!([{"homeWinPercentage": 0.42}]));
    assert_eq!(body["plays"], Value::Null);
    assert_eq!(body["meta"]["source"], json!({"gameState": "pre"}));
    assert_eq!(body["meta"]["date"], Value::Null);
    assert_eq!(body["meta"]["fromCache"], false);

    let (_, again) = get_json(&app, "/api/stats?away=Buffalo%20Bills&home=New%20York%20Jets").await;
    assert_eq!(again["eventId"], "401");
    assert_eq!(again["meta"]["fromCache"], true);
    assert_eq!(fake.count_calls("/summary"), 1);

    let (_, forced) = get_json(&app, "/api/stats?abbrAway=buf&abbrHome=nyj&force=1").await;
    assert_eq!(forced["meta"]["fromCache"], false);
    assert_eq!(fake.count_calls("/summary"), 2);
}

#[tokio::test]
async fn dated_miss_falls_back_to_current_scoreboard() {
    let fake = FakeUpstream::new();
    fake.serve(
        &site_url("hockey", "nhl", "scoreboard?dates=20251009"),
        board(
            "7",
            competitor("away", "1", "BOS", "Boston Bruins", "Bruins"),
            competitor("home", "2", "MTL", "Montreal Canadiens", "Canadiens"),
        ),
    );
    fake.serve(
        &site_url("hockey", "nhl", "scoreboard"),
        board(
            "8",
            competitor("away", "19", "STL", "St. Louis Blues", "Blues"),
            competitor("home", "4", "CHI", "Chicago Blackhawks", "Blackhawks"),
        ),
    );
    fake.serve(&site_url("hockey", "nhl", "summary?event=8"), json!({"header": {"id": "8"}}));
    let app = app(fake.clone(), Arc::new(ManualClock::new(NOW)));

    let (status, body) =
        get_json(&app, "/api/stats?league=nhl&away=Saint%20Louis%20Blues&home=Chicago&date=2025-10-09").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventId"], "8");
    assert_eq!(body["meta"]["date"], "20251009");
    assert_eq!(fake.count_calls("scoreboard?dates=20251009"), 1);
}

#[tokio::test]
async fn unknown_matchup_is_event_not_found() {
    let fake = FakeUpstream::new();
    fake.serve(&site_url("football", "nfl", "scoreboard"), bills_at_jets("401"));
    let app = app(fake.clone(), Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/stats?league=nfl&away=Chiefs&home=Broncos").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "event_not_found");
    assert_eq!(fake.count_calls("/summary"), 0);

    let (status, body) = get_json(&app, "/api/stats?league=xfl&away=Bills").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_league");
}

#[tokio::test]
async fn failed_summary_is_bad_gateway_unless_cached() {
    let fake = FakeUpstream::new();
    fake.serve(&site_url("football", "nfl", "scoreboard"), bills_at_jets("401"));
    fake.serve_status(&site_url("football", "nfl", "summary?event=401"), 503);
    let clock = Arc::new(ManualClock::new(NOW));
    let app = app(fake.clone(), clock.clone());

    let (status, body) = get_json(&app, "/api/stats?away=Bills&home=Jets").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "summary_unavailable");

    fake.serve(&site_url("football", "nfl", "summary?event=401"), summary_body());
    let (status, _) = get_json(&app, "/api/stats?away=Bills&home=Jets").await;
    assert_eq!(status, StatusCode::OK);

    // Past the TTL with the summary down again: the old entry is served stale.
    clock.advance_ms(61_000);
    fake.serve_status(&site_url("football", "nfl", "summary?event=401"), 503);
    let (status, body) = get_json(&app, "/api/stats?away=Bills&home=Jets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["stale"], true);
    assert_eq!(body["meta"]["error"], "upstream_unavailable");
    assert_eq!(body["header"], json!({"id": "401"}));
}
