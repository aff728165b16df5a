use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, warn};

use crate::api::{state::AppState, types::*};
use crate::cache::Cached;
use crate::domain::{sanitize_slug, Game, LeagueKey, LeagueScope, Team, TeamDirectory};
use crate::error::{GatewayError, Result};
use crate::games::{
    apply_overlay, filter_games, find_by_slug, games_from_scoreboard, sort_games, GameFilter, GamesSnapshot,
    ScoreboardIndex, SourceType, UpstreamCounts,
};

const FALLBACK_FAILED: &str = "scoreboard_fallback_failed";

/// Empty or missing means every league.
pub(crate) fn parse_scope(value: Option<&str>) -> Result<LeagueScope> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse(),
        None => Ok(LeagueScope::All),
    }
}

pub(crate) async fn league_teams(state: &AppState, league: LeagueKey, force: bool) -> std::result::Result<Cached<Vec<Team>>, crate::error::UpstreamError> {
    state
        .caches
        .teams
        .get_or_fetch(league.as_str(), force, || state.espn.teams(league))
        .await
}

/// Scores from each league scoreboard onto that league's live games. Scoreboard or team
/// directory failures leave the games as they are.
async fn overlay_scores(state: &AppState, mut games: Vec<Game>) -> Vec<Game> {
    let mut leagues: Vec<LeagueKey> = games.iter().filter(|g| g.is_live).map(|g| g.league).collect();
    leagues.sort_by_key(|l| l.priority());
    leagues.dedup();

    for league in leagues {
        let board = match state.espn.scoreboard(league).await {
            Ok(board) => board,
            Err(err) => {
                warn!(league = %league, error = %err, "score overlay skipped");
                continue;
            }
        };
        let directory = match league_teams(state, league, false).await {
            Ok(teams) => TeamDirectory::new(&teams.value),
            Err(err) => {
                debug!(league = %league, error = %err, "team directory unavailable for overlay");
                TeamDirectory::default()
            }
        };
        games = apply_overlay(games, league, &ScoreboardIndex::new(&board), &directory);
    }
    games
}

async fn build_snapshot(state: &AppState, scope: LeagueScope, filter: GameFilter, include_health: bool) -> Result<GamesSnapshot> {
    let snapshot = match state.match_feed.fetch_snapshot().await {
        Ok(snapshot) => {
            state.record_feed_success(snapshot.base.clone()).await;
            snapshot
        }
        Err(err) => {
            state.record_feed_failure(err.to_string()).await;
            return Err(err.into());
        }
    };

    let outcome = state.builder.build(&snapshot, scope, state.now_ms());
    let mut games = outcome.games;
    let mut source_type = SourceType::Streamed;
    let mut warning = None;

    if games.is_empty() {
        if let Some(league) = scope.league() {
            match state.espn.scoreboard(league).await {
                Ok(board) => {
                    games = games_from_scoreboard(&board, league);
                    source_type = SourceType::EspnScoreboard;
                    debug!(league = %league, count = games.len(), "served games from scoreboard");
                }
                Err(err) => {
                    warn!(league = %league, error = %err, "scoreboard fallback failed");
                    warning = Some(FALLBACK_FAILED.to_string());
                }
            }
        }
    }

    let mut games = filter_games(games, filter);
    sort_games(&mut games, scope);
    if source_type == SourceType::Streamed {
        games = overlay_scores(state, games).await;
    }
    if include_health {
        games = state.health.annotate_games(games).await;
    }

    Ok(GamesSnapshot {
        games,
        upstream_base: snapshot.base,
        source_type,
        upstream_counts: Some(UpstreamCounts {
            live: snapshot.live.len(),
            all: snapshot.all.len(),
        }),
        stats: Some(outcome.stats),
        warning,
    })
}

pub(crate) async fn load_games(
    state: &AppState,
    scope: LeagueScope,
    filter: GameFilter,
    include_health: bool,
    force: bool,
) -> Result<Cached<GamesSnapshot>> {
    let key = format!(
        "{}:{}:{}",
        scope,
        filter,
        if include_health { "health" } else { "plain" }
    );
    state
        .caches
        .games
        .get_or_fetch(&key, force, || build_snapshot(state, scope, filter, include_health))
        .await
}

fn games_meta(cached: &Cached<GamesSnapshot>, count: usize, scope: LeagueScope, filter: GameFilter, debug: bool) -> GamesMeta {
    let snapshot = &cached.value;
    GamesMeta {
        count,
        filter: filter.to_string(),
        league: scope.to_string(),
        cache_age_sec: cached.cache_age_sec,
        stale: cached.stale,
        upstream_base: snapshot.upstream_base.clone(),
        source_type: snapshot.source_type,
        from_cache: cached.from_cache,
        upstream_counts: snapshot.upstream_counts,
        warning: snapshot.warning.clone(),
        debug: if debug { snapshot.stats } else { None },
        error: cached.error.map(str::to_string),
    }
}

/// GET /api/games
pub async fn get_games(
    State(state): State<AppState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<GamesResponse>> {
    let scope = parse_scope(params.league.as_deref())?;
    let filter = GameFilter::parse_lenient(params.filter.as_deref());
    let cached = load_games(&state, scope, filter, flag(&params.include_health), flag(&params.force)).await?;

    let meta = games_meta(&cached, cached.value.games.len(), scope, filter, flag(&params.debug));
    Ok(Json(GamesResponse {
        games: cached.value.games,
        meta,
    }))
}

/// GET /api/games/:slug
pub async fn get_game(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<GameResponse>> {
    if sanitize_slug(&slug).is_empty() {
        return Err(GatewayError::missing("missing_slug", "slug"));
    }
    let scope = parse_scope(params.league.as_deref())?;
    let filter = GameFilter::All;
    let cached = load_games(&state, scope, filter, flag(&params.include_health), flag(&params.force)).await?;

    let mut found = find_by_slug(&cached.value.games, &slug);
    if found.is_none() {
        if let Some(league) = scope.league() {
            match state.espn.scoreboard(league).await {
                Ok(board) => found = find_by_slug(&games_from_scoreboard(&board, league), &slug),
                Err(err) => warn!(league = %league, slug = %slug, error = %err, "scoreboard lookup failed"),
            }
        }
    }

    let game = found.ok_or_else(|| GatewayError::NotFound(format!("no game matches '{slug}'")))?;
    let meta = games_meta(&cached, 1, scope, filter, flag(&params.debug));
    Ok(Json(GameResponse { game, meta }))
}

/// GET /api/games/ with an empty slug
pub async fn missing_slug() -> Result<Json<GameResponse>> {
    Err(GatewayError::missing("missing_slug", "slug"))
}
