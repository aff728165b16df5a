use axum::{
    extract::{Query, State},
    Json,
};

use super::standings::require_league;
use crate::api::{state::AppState, types::*};
use crate::domain::LeagueKey;
use crate::error::{GatewayError, Result, UpstreamError};
use crate::players::{
    parse_season, rank_leaders, table::DEFAULT_LEADERS_LIMIT, table::MAX_LEADERS_LIMIT, LeadersTable, Page,
    PlayerTable, StatsMode, TableSchema, TableView, PARTIAL_STATS,
};

/// Parameters shared by `/players` and `/leaders`, validated.
struct TableRequest {
    league: LeagueKey,
    view: TableView,
    mode: StatsMode,
    schema: TableSchema,
    position: Option<String>,
    season: Option<i32>,
    force: bool,
}

impl TableRequest {
    fn parse(state: &AppState, params: &PlayersQuery) -> Result<Self> {
        let league = require_league(params.league.as_deref())?;
        let view = match non_empty(&params.view) {
            Some(raw) => raw.parse()?,
            None => TableView::default(),
        };
        let mode = match non_empty(&params.mode) {
            Some(raw) => raw.parse()?,
            None => StatsMode::default(),
        };
        let schema = state
            .schemas
            .resolve(league, mode, view)
            .cloned()
            .ok_or_else(|| GatewayError::unsupported("unsupported_view", format!("no {} table for {league}", view.as_str())))?;
        Ok(Self {
            league,
            view,
            mode,
            schema,
            position: non_empty(&params.position)
                .filter(|p| !p.eq_ignore_ascii_case("all"))
                .map(str::to_uppercase),
            season: parse_season(params.season.as_deref()),
            force: flag(&params.force),
        })
    }

    /// Mode is only meaningful for MLB.
    fn reported_mode(&self) -> Option<StatsMode> {
        (self.league == LeagueKey::Mlb).then_some(self.mode)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/players
pub async fn get_players(
    State(state): State<AppState>,
    Query(params): Query<PlayersQuery>,
) -> Result<Json<PlayersResponse>> {
    let req = TableRequest::parse(&state, &params)?;
    let season = state.players.resolve_season(req.league, req.season, req.force).await;
    let index = state.players.roster_index(req.league, season, req.force).await?;

    let selected = index.value.select(req.league, req.mode, req.position.as_deref());
    let page = Page::resolve(number(&params.page), number(&params.per_page), selected.len());
    let (rows, partial) = state
        .players
        .rows(req.league, season, &req.schema, page.slice(&selected), page.offset + 1)
        .await;

    let mut cache = CacheMeta::from(&index);
    if partial {
        cache.warning = Some(PARTIAL_STATS.to_string());
    }
    Ok(Json(PlayersResponse {
        league: req.league.to_string(),
        season,
        view: req.view,
        mode: req.reported_mode(),
        position: req.position.clone(),
        page: page.page,
        per_page: page.per_page,
        total: selected.len(),
        table: PlayerTable {
            columns: req.schema.headers(),
            rows,
        },
        meta: PlayersMeta {
            cache,
            source: index.value.source.teams.clone(),
        },
    }))
}

async fn build_leaders(
    state: &AppState,
    req: &TableRequest,
    season: i32,
    sort: &str,
    limit: usize,
) -> std::result::Result<LeadersTable, UpstreamError> {
    let index = state.players.roster_index(req.league, season, req.force).await?.value;
    let selected = index.select(req.league, req.mode, req.position.as_deref());
    let (rows, partial) = state.players.rows(req.league, season, &req.schema, &selected, 1).await;
    Ok(LeadersTable {
        league: req.league,
        season,
        view: req.view,
        mode: req.reported_mode(),
        position: req.position.clone(),
        sort: sort.to_string(),
        limit,
        total: selected.len(),
        table: PlayerTable {
            columns: req.schema.headers(),
            rows: rank_leaders(rows, sort, limit),
        },
        partial,
    })
}

/// GET /api/leaders
pub async fn get_leaders(
    State(state): State<AppState>,
    Query(params): Query<PlayersQuery>,
) -> Result<Json<LeadersResponse>> {
    let req = TableRequest::parse(&state, &params)?;
    let sort = non_empty(&params.sort).unwrap_or(&req.schema.leader).to_string();
    if req.schema.column(&sort).is_none() {
        return Err(GatewayError::unsupported(
            "unsupported_sort",
            format!("'{sort}' is not a column of this table"),
        ));
    }
    let limit = number(&params.limit)
        .map(|n| n.clamp(1, MAX_LEADERS_LIMIT as i64) as usize)
        .unwrap_or(DEFAULT_LEADERS_LIMIT);
    let season = state.players.resolve_season(req.league, req.season, req.force).await;

    let key = format!(
        "{}:{}:{}:{}:{}:{}:{}",
        req.league,
        season,
        req.view.as_str(),
        req.reported_mode().map(|m| m.as_str()).unwrap_or("-"),
        req.position.as_deref().unwrap_or("all"),
        sort,
        limit
    );
    let cached = state
        .caches
        .leaders
        .get_or_fetch(&key, req.force, || build_leaders(&state, &req, season, &sort, limit))
        .await?;

    let mut meta = CacheMeta::from(&cached);
    if cached.value.partial {
        meta.warning = Some(PARTIAL_STATS.to_string());
    }
    Ok(Json(LeadersResponse {
        leaders: cached.value,
        meta,
    }))
}
