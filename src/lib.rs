pub mod adapters;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod games;
pub mod players;

pub use adapters::{EspnApi, HttpClient, JsonFetch, MatchFeed};
pub use api::{create_router, AppState};
pub use cache::{Caches, Clock, ManualClock, ResponseCache, SystemClock};
pub use config::AppConfig;
pub use coordination::{bounded_map, shutdown_signal};
pub use domain::{Game, LeagueKey, LeagueScope, RulesTable, Team};
pub use error::{GatewayError, Result, UpstreamError};
pub use games::{GameBuilder, LeagueClassifier};
pub use players::{PlayerDirectory, SchemaTable};
