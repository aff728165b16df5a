use axum::{
    extract::{Query, State},
    Json,
};

use super::games::{league_teams, parse_scope};
use crate::api::{state::AppState, types::*};
use crate::cache::Cached;
use crate::coordination::bounded_map;
use crate::domain::{LeagueKey, LeagueScope, Team};
use crate::error::Result;

/// Per-league lists merged in priority order. The oldest entry decides the age; any stale
/// league marks the whole response stale.
fn merge(results: Vec<Cached<Vec<Team>>>) -> Cached<Vec<Team>> {
    let mut merged = Cached {
        value: Vec::new(),
        from_cache: true,
        stale: false,
        cache_age_sec: 0,
        error: None,
    };
    for part in results {
        merged.from_cache &= part.from_cache;
        merged.stale |= part.stale;
        merged.cache_age_sec = merged.cache_age_sec.max(part.cache_age_sec);
        merged.error = merged.error.or(part.error);
        merged.value.extend(part.value);
    }
    merged
}

/// GET /api/teams
pub async fn get_teams(
    State(state): State<AppState>,
    Query(params): Query<LeagueQuery>,
) -> Result<Json<TeamsResponse>> {
    let scope = parse_scope(params.league.as_deref())?;
    let force = flag(&params.force);

    let cached = match scope {
        LeagueScope::League(league) => league_teams(&state, league, force).await?,
        LeagueScope::All => {
            let results = bounded_map(LeagueKey::PRIORITY.to_vec(), LeagueKey::PRIORITY.len(), |league| {
                let state = &state;
                async move { league_teams(state, league, force).await }
            })
            .await;
            merge(results.into_iter().collect::<std::result::Result<Vec<_>, _>>()?)
        }
    };

    let meta = TeamsMeta {
        count: cached.value.len(),
        league: scope.to_string(),
        cache: CacheMeta::from(&cached),
    };
    Ok(Json(TeamsResponse {
        teams: cached.value,
        meta,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(names: &[&str], from_cache: bool, stale: bool, age: u64) -> Cached<Vec<Team>> {
        Cached {
            value: names
                .iter()
                .map(|n| Team {
                    id: None,
                    abbreviation: n.to_uppercase(),
                    name: n.to_string(),
                    short_name: n.to_string(),
                    logo: None,
                    color: None,
                    alternate_color: None,
                    league: None,
                })
                .collect(),
            from_cache,
            stale,
            cache_age_sec: age,
            error: stale.then_some("upstream_unavailable"),
        }
    }

    #[test]
    fn test_merge_keeps_order_and_worst_freshness() {
        let merged = merge(vec![part(&["bills"], true, false, 10), part(&["celtics", "knicks"], false, true, 400)]);
        let names: Vec<&str> = merged.value.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["bills", "celtics", "knicks"]);
        assert!(!merged.from_cache);
        assert!(merged.stale);
        assert_eq!(merged.cache_age_sec, 400);
        assert_eq!(merged.error, Some("upstream_unavailable"));
    }
}
