//! lapse - expiring in-memory session store
//!
//! Main entry point for the lapse CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, demo, watch};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// lapse - expiring in-memory session store
#[derive(Parser)]
#[command(name = "lapse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Load this config file instead of discovering config layers
    #[arg(long, global = true, env = "LAPSE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a session, store a value in it and read it back
    Demo(demo::DemoArgs),

    /// Create a session and report how long it survives untouched
    Watch(watch::WatchArgs),

    /// Show the resolved configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (loaded, sources) = match cli.config {
        Some(ref path) => {
            let config = lapse_config::load_config_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (config, vec![path.clone()])
        }
        None => {
            let loaded =
                lapse_config::load_config().context("Failed to load configuration")?;
            (loaded.config, loaded.sources)
        }
    };

    // Initialize tracing: console (human-readable) plus optional rolling JSON file
    let logging = loaded.logging();
    let filter = match (&logging.filter, cli.verbose) {
        (_, true) => "lapse=debug,lapse_session=debug,lapse_config=debug,info".to_string(),
        (Some(filter), false) => filter.clone(),
        (None, false) => "lapse=info,lapse_session=info,warn".to_string(),
    };

    let file_writer = if logging.file {
        let log_dir = lapse_config::user_config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "lapse.log");
        Some(tracing_appender::non_blocking(file_appender))
    } else {
        None
    };
    let (file_layer, _guard) = match file_writer {
        Some((non_blocking, guard)) => (Some(non_blocking), Some(guard)),
        None => (None, None),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "lapse=trace,lapse_session=trace,lapse_config=trace,info",
                ))
        }))
        .init();

    // Create context for commands
    let ctx = commands::Context {
        config: loaded,
        sources,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Demo(args) => demo::run(args, &ctx).await,
        Commands::Watch(args) => watch::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
