use axum::{
    extract::{Query, State},
    Json,
};

use crate::api::{state::AppState, types::*};
use crate::domain::sanitize_slug;
use crate::error::{GatewayError, Result};
use crate::games::builder::iso_from_ms;

/// GET /api/health -- liveness plus the streamed-matches feed state
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let feed = state.feed_status.read().await.clone();
    let cache_age_sec = feed
        .last_fetch_ms
        .map(|at| ((state.now_ms() - at).max(0) / 1000) as u64);

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_sec: state.uptime_seconds(),
        games: FeedHealth {
            cache_age_sec,
            last_fetch: feed.last_fetch_ms.and_then(iso_from_ms),
            last_error: feed.last_error,
            upstream_base: feed.upstream_base,
        },
    })
}

/// GET /api/streams/check
pub async fn check_stream(
    State(state): State<AppState>,
    Query(params): Query<StreamCheckQuery>,
) -> Result<Json<StreamCheckResponse>> {
    let slug = params.slug.as_deref().map(sanitize_slug).unwrap_or_default();
    if slug.is_empty() {
        return Err(GatewayError::missing("missing_slug", "slug"));
    }
    let source = params
        .source
        .as_deref()
        .map(sanitize_slug)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "admin".to_string());
    let stream = number(&params.stream)
        .map(|n| n.clamp(1, i64::from(u32::MAX)) as u32)
        .unwrap_or(1);

    let health = state.health.check(&source, &slug, stream).await;
    Ok(Json(StreamCheckResponse {
        slug,
        source,
        stream,
        health,
    }))
}
