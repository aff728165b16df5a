use clap::{Parser, Subcommand};

use crate::adapters::RawMatch;
use crate::domain::LeagueKey;
use crate::games::LeagueClassifier;

#[derive(Parser)]
#[command(name = "scoreline")]
#[command(version)]
#[command(about = "Sports-data gateway: streamed matches and ESPN feeds behind a cached JSON API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway (default)
    Serve {
        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding default.toml and per-environment overrides
        #[arg(long, default_value = "config")]
        config_dir: String,
    },

    /// Print the league a raw match record would be classified as
    Classify {
        #[arg(long)]
        title: String,

        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },
}

/// League for a hand-written record, as the game builder would see it.
pub fn classify(classifier: &LeagueClassifier, title: &str, id: Option<&str>, category: Option<&str>) -> Option<LeagueKey> {
    let raw = RawMatch {
        id: id.map(str::to_string),
        title: Some(title.to_string()),
        category: category.map(str::to_string),
        ..RawMatch::default()
    };
    classifier.identify(&raw)
}
