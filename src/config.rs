use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
///
/// Keys are flat so that the process environment (`GAMES_CACHE_TTL_MS=...`) maps onto
/// fields one to one.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Streamed-matches API bases, tried in order
    #[serde(default = "default_stream_api_bases")]
    pub stream_api_bases: Vec<String>,
    /// Host used to resolve relative badge and poster paths
    #[serde(default = "default_streamed_image_base")]
    pub streamed_image_base: String,
    /// Embed host probed by source health checks
    #[serde(default = "default_embed_base_url")]
    pub embed_base_url: String,
    #[serde(default = "default_espn_site_api_base")]
    pub espn_site_api_base: String,
    #[serde(default = "default_espn_core_api_base")]
    pub espn_core_api_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // Cache TTLs (milliseconds)
    #[serde(default = "default_games_ttl")]
    pub games_cache_ttl_ms: u64,
    #[serde(default = "default_teams_ttl")]
    pub teams_cache_ttl_ms: u64,
    #[serde(default = "default_standings_ttl")]
    pub standings_cache_ttl_ms: u64,
    #[serde(default = "default_playoffs_ttl")]
    pub playoffs_cache_ttl_ms: u64,
    /// Game summaries behind `/api/stats`
    #[serde(default = "default_stats_ttl")]
    pub stats_cache_ttl_ms: u64,
    #[serde(default = "default_players_index_ttl")]
    pub players_index_cache_ttl_ms: u64,
    #[serde(default = "default_players_team_ttl")]
    pub players_team_cache_ttl_ms: u64,
    #[serde(default = "default_players_stats_ttl")]
    pub players_stats_cache_ttl_ms: u64,
    #[serde(default = "default_players_season_ttl")]
    pub players_season_cache_ttl_ms: u64,
    #[serde(default = "default_leaders_ttl")]
    pub leaders_cache_ttl_ms: u64,
    #[serde(default = "default_health_ttl")]
    pub health_cache_ttl_ms: u64,

    /// Upper bound on in-flight roster/stats fetches per request
    #[serde(default = "default_fetch_concurrency")]
    pub players_fetch_concurrency: usize,
    /// Fresh source probes allowed per `includeHealth` request
    #[serde(default = "default_max_health_checks")]
    pub max_health_checks: usize,

    /// A live-feed record older than this is no longer reported live
    #[serde(default = "default_live_max_age")]
    pub live_max_age_sec: i64,
    /// A start time older than this counts as ended
    #[serde(default = "default_ended_grace")]
    pub ended_grace_sec: i64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Replaces the compiled-in league rules table
    #[serde(default)]
    pub league_rules_path: Option<String>,

    // Logging
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_port() -> u16 {
    8001
}

fn default_stream_api_bases() -> Vec<String> {
    vec!["https://streamed.pk/api".to_string()]
}

fn default_streamed_image_base() -> String {
    "https://streamed.pk".to_string()
}

fn default_embed_base_url() -> String {
    "https://embedsports.top/embed".to_string()
}

fn default_espn_site_api_base() -> String {
    "https://site.api.espn.com".to_string()
}

fn default_espn_core_api_base() -> String {
    "https://sports.core.api.espn.com".to_string()
}

fn default_user_agent() -> String {
    concat!("scoreline/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_games_ttl() -> u64 {
    45_000
}

fn default_teams_ttl() -> u64 {
    86_400_000
}

fn default_standings_ttl() -> u64 {
    300_000
}

fn default_playoffs_ttl() -> u64 {
    60_000
}

fn default_stats_ttl() -> u64 {
    60_000
}

fn default_players_index_ttl() -> u64 {
    3_600_000
}

fn default_players_team_ttl() -> u64 {
    43_200_000
}

fn default_players_stats_ttl() -> u64 {
    900_000
}

fn default_players_season_ttl() -> u64 {
    43_200_000
}

fn default_leaders_ttl() -> u64 {
    900_000
}

fn default_health_ttl() -> u64 {
    120_000
}

fn default_fetch_concurrency() -> usize {
    10
}

fn default_max_health_checks() -> usize {
    10
}

fn default_live_max_age() -> i64 {
    14_400
}

fn default_ended_grace() -> i64 {
    21_600
}

fn default_fetch_timeout() -> u64 {
    8_000
}

fn default_fetch_retries() -> u32 {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            stream_api_bases: default_stream_api_bases(),
            streamed_image_base: default_streamed_image_base(),
            embed_base_url: default_embed_base_url(),
            espn_site_api_base: default_espn_site_api_base(),
            espn_core_api_base: default_espn_core_api_base(),
            user_agent: default_user_agent(),
            games_cache_ttl_ms: default_games_ttl(),
            teams_cache_ttl_ms: default_teams_ttl(),
            standings_cache_ttl_ms: default_standings_ttl(),
            playoffs_cache_ttl_ms: default_playoffs_ttl(),
            stats_cache_ttl_ms: default_stats_ttl(),
            players_index_cache_ttl_ms: default_players_index_ttl(),
            players_team_cache_ttl_ms: default_players_team_ttl(),
            players_stats_cache_ttl_ms: default_players_stats_ttl(),
            players_season_cache_ttl_ms: default_players_season_ttl(),
            leaders_cache_ttl_ms: default_leaders_ttl(),
            health_cache_ttl_ms: default_health_ttl(),
            players_fetch_concurrency: default_fetch_concurrency(),
            max_health_checks: default_max_health_checks(),
            live_max_age_sec: default_live_max_age(),
            ended_grace_sec: default_ended_grace(),
            fetch_timeout_ms: default_fetch_timeout(),
            fetch_retries: default_fetch_retries(),
            league_rules_path: None,
            log_level: None,
            log_json: false,
            log_dir: None,
        }
    }
}

/// Per-endpoint cache lifetimes
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub games: Duration,
    pub teams: Duration,
    pub standings: Duration,
    pub playoffs: Duration,
    pub stats: Duration,
    pub roster_index: Duration,
    pub team_list: Duration,
    pub athlete_stats: Duration,
    pub seasons: Duration,
    pub leaders: Duration,
    pub source_health: Duration,
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("port", i64::from(default_port()))?
            .set_default("log_json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SCORELINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with plain environment variables (GAMES_CACHE_TTL_MS, STREAM_API_BASES, ...)
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("stream_api_bases"),
            );

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.stream_api_bases = cfg
            .stream_api_bases
            .iter()
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .collect();
        Ok(cfg)
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        let ms = Duration::from_millis;
        CacheTtls {
            games: ms(self.games_cache_ttl_ms),
            teams: ms(self.teams_cache_ttl_ms),
            standings: ms(self.standings_cache_ttl_ms),
            playoffs: ms(self.playoffs_cache_ttl_ms),
            stats: ms(self.stats_cache_ttl_ms),
            roster_index: ms(self.players_index_cache_ttl_ms),
            team_list: ms(self.players_team_cache_ttl_ms),
            athlete_stats: ms(self.players_stats_cache_ttl_ms),
            seasons: ms(self.players_season_cache_ttl_ms),
            leaders: ms(self.leaders_cache_ttl_ms),
            source_health: ms(self.health_cache_ttl_ms),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.stream_api_bases.is_empty() {
            errors.push("STREAM_API_BASES must list at least one base URL".to_string());
        }

        for base in &self.stream_api_bases {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                errors.push(format!("stream api base is not an http(s) URL: {base}"));
            }
        }

        if self.fetch_timeout_ms == 0 {
            errors.push("FETCH_TIMEOUT_MS must be positive".to_string());
        }

        if self.players_fetch_concurrency == 0 {
            errors.push("PLAYERS_FETCH_CONCURRENCY must be at least 1".to_string());
        }

        if self.live_max_age_sec < 0 || self.ended_grace_sec < 0 {
            errors.push("LIVE_MAX_AGE_SEC and ENDED_GRACE_SEC must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.games_cache_ttl_ms, 45_000);
        assert_eq!(cfg.players_fetch_concurrency, 10);
        assert_eq!(cfg.cache_ttls().teams, Duration::from_secs(86_400));
        assert_eq!(cfg.cache_ttls().stats, Duration::from_secs(60));
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let cfg = AppConfig {
            stream_api_bases: vec![],
            fetch_timeout_ms: 0,
            players_fetch_concurrency: 0,
            ..AppConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_load_from_reads_default_toml() {
        let dir = std::env::temp_dir().join(format!("scoreline-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            "espn_site_api_base = \"http://espn.test\"\nstream_api_bases = [\"https://a.example/api/\"]\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&dir).unwrap();
        assert_eq!(cfg.espn_site_api_base, "http://espn.test");
        assert_eq!(cfg.stream_api_bases, vec!["https://a.example/api".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
