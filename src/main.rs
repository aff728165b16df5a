use anyhow::Context;
use clap::Parser;
use scoreline::api::{create_router, AppState};
use scoreline::cli::{self, Cli, Commands};
use scoreline::config::AppConfig;
use scoreline::coordination::shutdown_signal;
use scoreline::domain::RulesTable;
use scoreline::games::LeagueClassifier;
use scoreline::{HttpClient, SystemClock};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Classify { title, id, category }) => {
            init_logging_simple();
            let rules = match std::env::var("LEAGUE_RULES_PATH") {
                Ok(path) => RulesTable::from_path(&path).with_context(|| format!("loading league rules from {path}"))?,
                Err(_) => RulesTable::builtin()?,
            };
            let classifier = LeagueClassifier::new(rules);
            match cli::classify(&classifier, &title, id.as_deref(), category.as_deref()) {
                Some(league) => println!("{league}"),
                None => println!("unmatched"),
            }
        }
        Some(Commands::Serve { port, config_dir }) => run_server(port, &config_dir).await?,
        None => run_server(None, "config").await?,
    }

    Ok(())
}

async fn run_server(port: Option<u16>, config_dir: &str) -> anyhow::Result<()> {
    let mut config = AppConfig::load_from(config_dir).context("loading configuration")?;
    if let Some(port) = port {
        config.port = port;
    }
    init_logging(&config);

    if let Err(problems) = config.validate() {
        anyhow::bail!("invalid configuration: {}", problems.join("; "));
    }

    let fetch = Arc::new(HttpClient::from_config(&config)?);
    let state = AppState::new(config, fetch, Arc::new(SystemClock))?;
    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = create_router(state.clone());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        addr = %addr,
        stream_bases = ?state.config.stream_api_bases,
        "scoreline listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let default_directive = config
        .log_level
        .clone()
        .unwrap_or_else(|| "info,scoreline=debug".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_directive));

    // `rolling::daily` panics when it cannot create the first file, so preflight the directory.
    let file_layer = config.log_dir.as_deref().and_then(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: Could not create log directory {log_dir} ({e}), file logging disabled");
            return None;
        }
        let test_path = std::path::Path::new(log_dir).join(".scoreline_write_test");
        match std::fs::OpenOptions::new().create(true).append(true).open(&test_path) {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let file_appender = tracing_appender::rolling::daily(log_dir, "scoreline.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // The process runs until shutdown; the guard flushes on drop.
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!("Warning: Could not write to log directory {log_dir} ({e}), file logging disabled");
                None
            }
        }
    });

    let console_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().with_target(true).boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if file_logging_enabled {
        if let Some(dir) = &config.log_dir {
            info!(dir = %dir, "file logging enabled");
        }
    } else if config.log_dir.is_some() {
        warn!("file logging requested but unavailable");
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
