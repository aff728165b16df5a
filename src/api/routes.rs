use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // Read-only surface for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        // Games
        .route("/api/games", get(handlers::get_games))
        .route("/api/games/", get(handlers::missing_slug))
        .route("/api/games/:slug", get(handlers::get_game))
        // League data
        .route("/api/teams", get(handlers::get_teams))
        .route("/api/standings", get(handlers::get_standings))
        .route("/api/playoffs", get(handlers::get_playoffs))
        .route("/api/stats", get(handlers::get_stats))
        // Players
        .route("/api/players", get(handlers::get_players))
        .route("/api/leaders", get(handlers::get_leaders))
        // System
        .route("/api/health", get(handlers::health_handler))
        .route("/api/streams/check", get(handlers::check_stream))
        .with_state(state)
        .layer(cors)
}
