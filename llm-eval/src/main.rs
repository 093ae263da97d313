use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod dataset;

use crate::config::Settings;

/// Run evaluations over JSONL datasets
#[derive(Debug, Parser)]
#[command(name = "llm-eval", version, about)]
struct Cli {
    /// Log level when RUST_LOG is unset (overrides settings)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a dataset of recorded outputs
    Score(commands::ScoreArgs),

    /// Apply database migrations
    Migrate {
        /// Database URL, overriding settings
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(level) = cli.log_level.clone() {
        settings.log_level = level;
    }
    settings.log_json |= cli.log_json;

    init_tracing(&settings);
    tracing::debug!(?settings, "Settings loaded");

    match cli.command {
        Command::Score(args) => commands::score(args, &settings).await,
        Command::Migrate { database_url } => commands::migrate_database(database_url, &settings).await,
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if settings.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
