use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{debug, warn};

use crate::adapters::espn::Scoreboard;
use crate::api::{state::AppState, types::*};
use crate::domain::LeagueKey;
use crate::error::{GatewayError, Result, UpstreamError};
use crate::games::{find_event, Matchup};

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn describe(matchup: &Matchup) -> String {
    let side = |name: &Option<String>, abbr: &Option<String>| {
        name.clone().or_else(|| abbr.clone()).unwrap_or_else(|| "?".to_string())
    };
    format!(
        "{} at {}",
        side(&matchup.away_name, &matchup.away_abbr),
        side(&matchup.home_name, &matchup.home_abbr)
    )
}

/// Dated scoreboard first when a date was given; on a miss or failure, today's board.
async fn locate_event(
    state: &AppState,
    league: LeagueKey,
    date: Option<&str>,
    matchup: &Matchup,
) -> std::result::Result<Option<String>, UpstreamError> {
    if let Some(date) = date {
        match state.espn.scoreboard_on(league, date).await {
            Ok(board) => {
                if let Some(event) = find_event(&board, matchup) {
                    return Ok(Some(event.id.clone()));
                }
                debug!(league = %league, date, "no match on dated scoreboard, trying current");
            }
            Err(err) => warn!(league = %league, date, error = %err, "dated scoreboard failed, trying current"),
        }
    }
    let board: Scoreboard = state.espn.scoreboard(league).await?;
    Ok(find_event(&board, matchup).map(|event| event.id.clone()))
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let league: LeagueKey = non_empty(&params.league).as_deref().unwrap_or("nfl").parse()?;
    let matchup = Matchup {
        away_abbr: non_empty(&params.abbr_away),
        home_abbr: non_empty(&params.abbr_home),
        away_name: non_empty(&params.away),
        home_name: non_empty(&params.home),
    };
    let date = scoreboard_date(&params.date);

    let event_id = match locate_event(&state, league, date.as_deref(), &matchup).await? {
        Some(id) => id,
        None => return Err(GatewayError::EventNotFound(describe(&matchup))),
    };

    let key = format!("{}:{}", league.as_str(), event_id);
    let (espn, id) = (&state.espn, event_id.as_str());
    let cached = state
        .caches
        .stats
        .get_or_fetch(&key, flag(&params.force), || async move {
            espn.summary(league, id).await.map_err(GatewayError::SummaryUnavailable)
        })
        .await?;

    let cache = CacheMeta::from(&cached);
    let summary = cached.value;
    Ok(Json(StatsResponse {
        meta: StatsMeta {
            source: summary.source.clone(),
            date,
            cache,
        },
        event_id,
        league: league.to_string(),
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prefers_names() {
        let matchup = Matchup {
            away_abbr: Some("BUF".into()),
            home_abbr: Some("NYJ".into()),
            home_name: Some("Jets".into()),
            ..Matchup::default()
        };
        assert_eq!(describe(&matchup), "BUF at Jets");
        assert_eq!(describe(&Matchup::default()), "? at ?");
    }

    #[test]
    fn test_blank_params_are_absent() {
        assert_eq!(non_empty(&Some("  ".into())), None);
        assert_eq!(non_empty(&Some(" Bills ".into())), Some("Bills".into()));
    }
}
