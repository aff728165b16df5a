mod common;

use axum::http::StatusCode;
use common::*;
use scoreline::cache::ManualClock;
use serde_json::{json, Value};
use std::sync::Arc;

fn bills_jets_live() -> Value {
    json!([{
        "id": "bills-jets-2025",
        "title": "Buffalo Bills vs New York Jets",
        "category": "american-football",
        "date": NOW
    }])
}

fn nfl_scoreboard() -> Value {
    json!({
        "leagues": [{"season": {"year": 2025, "type": {"type": 2}}}],
        "events": [{
            "id": "401",
            "name": "Buffalo Bills at New York Jets",
            "date": "2025-10-09T08:00Z",
            "competitions": [{
                "competitors": [
                    {"homeAway": "home", "score": "17",
                     "team": {"id": "20", "abbreviation": "NYJ", "displayName": "New York Jets", "shortDisplayName": "Jets"}},
                    {"homeAway": "away", "score": "24",
                     "team": {"id": "2", "abbreviation": "BUF", "displayName": "Buffalo Bills", "shortDisplayName": "Bills"}}
                ],
                "status": {"type": {"state": "in", "completed": false}}
            }]
        }]
    })
}

#[tokio::test]
async fn live_nfl_game_is_classified_and_built() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), bills_jets_live());
    fake.serve(&all_url(), json!([]));
    let app = app(fake.clone(), Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/games?league=nfl").await;
    assert_eq!(status, StatusCode::OK);
    let game = &body["games"][0];
    assert_eq!(game["isLive"], true);
    assert_eq!(game["isUpcoming"], false);
    assert_eq!(game["currentSource"], "admin");
    assert_eq!(game["league"], "nfl");
    assert_eq!(game["teams"]["away"]["name"], "Buffalo Bills");
    assert_eq!(game["teams"]["home"]["name"], "New York Jets");

    let meta = &body["meta"];
    assert_eq!(meta["count"], 1);
    assert_eq!(meta["league"], "nfl");
    assert_eq!(meta["filter"], "all");
    assert_eq!(meta["sourceType"], "streamed");
    assert_eq!(meta["upstreamBase"], STREAM_BASE);
    assert_eq!(meta["upstreamCounts"], json!({"live": 1, "all": 0}));
    assert_eq!(meta["stale"], false);
    assert_eq!(meta["fromCache"], false);
    assert!(meta.get("debug").is_none());

    // Second request is a fresh cache hit.
    let (_, again) = get_json(&app, "/api/games?league=nfl").await;
    assert_eq!(again["meta"]["fromCache"], true);
    assert_eq!(fake.count_calls("/matches/live"), 1);
}

#[tokio::test]
async fn excluded_records_are_dropped_from_all() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), json!([]));
    fake.serve(
        &all_url(),
        json!([
            {"id": "college", "title": "NCAAF Bills vs Jets", "category": "american-football", "date": NOW + 3_600_000},
            {"id": "celtics-lakers", "title": "Boston Celtics vs Los Angeles Lakers", "category": "basketball", "date": NOW + 3_600_000}
        ]),
    );
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/games?filter=upcoming&debug=1").await;
    assert_eq!(status, StatusCode::OK);
    let games = body["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["league"], "nba");
    assert_eq!(games[0]["isUpcoming"], true);
    assert_eq!(body["meta"]["league"], "all");
    assert_eq!(body["meta"]["filter"], "upcoming");
    assert_eq!(body["meta"]["debug"]["unmatched"], 1);
}

#[tokio::test]
async fn live_listing_wins_over_scheduled_duplicate() {
    let fake = FakeUpstream::new();
    fake.serve(
        &live_url(),
        json!([{"id": "A", "title": "Bills vs Jets", "category": "american-football", "date": NOW}]),
    );
    fake.serve(
        &all_url(),
        json!([{"id": "B", "title": "Buffalo Bills vs New York Jets", "category": "american-football", "date": NOW}]),
    );
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (_, body) = get_json(&app, "/api/games?league=nfl").await;
    let games = body["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["isLive"], true);
    assert_eq!(games[0]["matchId"], "A");
}

#[tokio::test]
async fn upstream_failure_serves_stale_entry() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), bills_jets_live());
    fake.serve(&all_url(), json!([]));
    let clock = Arc::new(ManualClock::new(NOW));
    let app = app(fake.clone(), clock.clone());

    let (status, _) = get_json(&app, "/api/games?league=nfl").await;
    assert_eq!(status, StatusCode::OK);

    clock.advance_ms(60_000);
    fake.set_failing(true);
    let (status, body) = get_json(&app, "/api/games?league=nfl").await;
    assert_eq!(status, StatusCode::OK);
    let meta = &body["meta"];
    assert_eq!(meta["stale"], true);
    assert_eq!(meta["fromCache"], true);
    assert_eq!(meta["error"], "upstream_unavailable");
    assert_eq!(meta["cacheAgeSec"], 60);
    assert_eq!(body["games"].as_array().unwrap().len(), 1);

    // No entry to fall back on for a different key.
    let (status, body) = get_json(&app, "/api/games?league=nba").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_unavailable");

    let (_, health) = get_json(&app, "/api/health").await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["games"]["upstreamBase"], STREAM_BASE);
    assert!(health["games"]["lastError"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn slug_lookup_resolves_alternate_source() {
    let fake = FakeUpstream::new();
    fake.serve(
        &live_url(),
        json!([{
            "id": "primary-id",
            "title": "Buffalo Bills vs New York Jets",
            "category": "american-football",
            "date": NOW,
            "sources": [{"source": "admin", "id": "primary-id"}, {"source": "charlie", "id": "alt-id"}]
        }]),
    );
    fake.serve(&all_url(), json!([]));
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/games/alt-id?league=nfl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["slug"], "alt-id");
    assert_eq!(body["game"]["currentSource"], "charlie");
    assert_eq!(body["meta"]["count"], 1);

    let (status, body) = get_json(&app, "/api/games/primary-id").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["currentSource"], "admin");

    let (status, body) = get_json(&app, "/api/games/nothing-here?league=nfl").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = get_json(&app, "/api/games/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_slug");
}

#[tokio::test]
async fn empty_league_feed_falls_back_to_scoreboard() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), json!([]));
    fake.serve(&all_url(), json!([]));
    fake.serve(&site_url("football", "nfl", "scoreboard"), nfl_scoreboard());
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (status, body) = get_json(&app, "/api/games?league=nfl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["sourceType"], "espn_scoreboard");
    let game = &body["games"][0];
    assert_eq!(game["id"], "espn_401");
    assert_eq!(game["source"], "espn");
    assert_eq!(game["isLive"], true);
    assert_eq!(game["title"], "Buffalo Bills vs New York Jets");

    let (status, body) = get_json(&app, "/api/games/401?league=nfl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["id"], "espn_401");
}

#[tokio::test]
async fn live_games_carry_scoreboard_scores() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), bills_jets_live());
    fake.serve(&all_url(), json!([]));
    fake.serve(&site_url("football", "nfl", "scoreboard"), nfl_scoreboard());
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (_, body) = get_json(&app, "/api/games?league=nfl&filter=live").await;
    let teams = &body["games"][0]["teams"];
    assert_eq!(teams["away"]["score"], 24);
    assert_eq!(teams["home"]["score"], 17);
    assert_eq!(body["meta"]["sourceType"], "streamed");
}

#[tokio::test]
async fn include_health_annotates_sources() {
    let fake = FakeUpstream::new();
    fake.serve(&live_url(), bills_jets_live());
    fake.serve(&all_url(), json!([]));
    let app = app(fake, Arc::new(ManualClock::new(NOW)));

    let (_, body) = get_json(&app, "/api/games?league=nfl&includeHealth=1").await;
    let source = &body["games"][0]["sources"][0];
    assert_eq!(source["source"], "admin");
    assert_eq!(source["health"]["status"], "up");
    assert_eq!(source["health"]["httpStatus"], 200);

    let (status, body) = get_json(&app, "/api/streams/check?slug=bills-jets-2025").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "admin");
    assert_eq!(body["stream"], 1);
    assert_eq!(body["health"]["status"], "up");
}

#[tokio::test]
async fn unsupported_league_is_rejected() {
    let app = app(FakeUpstream::new(), Arc::new(ManualClock::new(NOW)));
    let (status, body) = get_json(&app, "/api/games?league=xfl").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_league");
}
