use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use foodmap::search::{SearchOptions, SearchOrchestrator};
use foodmap::{FoodMapConfig, telemetry, web};

/// Community food map: find food assistance resources with plain-language search
#[derive(Parser)]
#[command(name = "foodmap", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the result as JSON
    Search {
        /// Free-text request, e.g. "non-perishable food near Rabbittown"
        query: String,

        /// Per-call timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,

        /// Fail when the location cannot be geocoded because the provider is down
        #[arg(long)]
        strict: bool,
    },
    /// Serve the search API over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = FoodMapConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let telemetry_guard = telemetry::init(&config.logging)?;

    let orchestrator = SearchOrchestrator::from_config(&config)
        .with_context(|| "Failed to set up search pipeline")?;

    match cli.command {
        Command::Search {
            query,
            timeout_secs,
            strict,
        } => {
            let mut options = SearchOptions::from(&config.search);
            if let Some(seconds) = timeout_secs {
                options.timeout = Duration::from_secs(seconds);
            }
            options.strict_geocoding |= strict;

            match orchestrator.search_with_options(&query, options).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Search failed: {}", e);
                    eprintln!("[{}] {}", e.code().as_str(), e.user_message());
                    drop(telemetry_guard);
                    std::process::exit(1);
                }
            }
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            web::run(orchestrator, &config.server.host, port).await
        }
    }
}
