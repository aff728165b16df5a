use axum::{
    extract::{Query, State},
    Json,
};
use tracing::warn;

use crate::adapters::espn::{build_playoffs, scoreboard::POSTSEASON, Playoffs};
use crate::api::{state::AppState, types::*};
use crate::domain::LeagueKey;
use crate::error::{GatewayError, Result, UpstreamError};
use crate::players::parse_season;

/// League is mandatory here; `all` is not accepted.
pub(crate) fn require_league(value: Option<&str>) -> Result<LeagueKey> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse(),
        None => Err(GatewayError::missing("missing_league", "league")),
    }
}

/// GET /api/standings
pub async fn get_standings(
    State(state): State<AppState>,
    Query(params): Query<LeagueQuery>,
) -> Result<Json<StandingsResponse>> {
    let league = require_league(params.league.as_deref())?;
    let season = parse_season(params.season.as_deref());
    let key = match season {
        Some(season) => format!("{}:{}", league.as_str(), season),
        None => format!("{}:current", league.as_str()),
    };

    let cached = state
        .caches
        .standings
        .get_or_fetch(&key, flag(&params.force), || state.espn.standings(league, season))
        .await?;

    let meta = CacheMeta::from(&cached);
    Ok(Json(StandingsResponse {
        standings: cached.value,
        meta,
    }))
}

/// A second, season-wide fetch only happens when the current scoreboard is postseason.
async fn fetch_playoffs(state: &AppState, league: LeagueKey) -> std::result::Result<Playoffs, UpstreamError> {
    let board = state.espn.scoreboard(league).await?;
    let year = match (board.season_type, board.season_year) {
        (Some(POSTSEASON), Some(year)) => year,
        _ => return Ok(build_playoffs(&board, None)),
    };
    match state.espn.postseason_scoreboard(league, year).await {
        Ok(full) => Ok(build_playoffs(&board, Some(&full))),
        Err(err) => {
            warn!(league = %league, year, error = %err, "postseason scoreboard failed, using current events");
            Ok(build_playoffs(&board, None))
        }
    }
}

/// GET /api/playoffs
pub async fn get_playoffs(
    State(state): State<AppState>,
    Query(params): Query<LeagueQuery>,
) -> Result<Json<PlayoffsResponse>> {
    let league = require_league(params.league.as_deref())?;

    let cached = state
        .caches
        .playoffs
        .get_or_fetch(league.as_str(), flag(&params.force), || fetch_playoffs(&state, league))
        .await?;

    let meta = CacheMeta::from(&cached);
    Ok(Json(PlayoffsResponse {
        playoffs: cached.value,
        league: league.to_string(),
        meta,
    }))
}
