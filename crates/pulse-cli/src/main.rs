//! Pulse CLI - Post and browse island reports from the terminal
//!
//! Markers are read from and written to the marker API configured through
//! `PULSE_API_URL`; without it every command runs offline on sample data.

mod cli;
mod commands;
mod error;


use clap::Parser;
use pulse_core::moderation::ContentModerator;
use pulse_core::viewport::ViewportController;
use pulse_core::{Coordinate, PulseConfig, PulseSession, RuntimeConfig};

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, AddArgs};
use crate::commands::common::{build_remote, load_catalog, open_session, CliRemote};
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::moderate::run_moderate;
use crate::commands::places::{run_labels, run_regions, run_resolve, run_search};
use crate::commands::stats::run_stats;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "pulse=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Regions => run_regions(&ViewportController::new(&config)?),
        Commands::Resolve { lat, lng } => run_resolve(&ViewportController::new(&config)?, lat, lng),
        Commands::Search { query, json } => {
            run_search(&ViewportController::new(&config)?, &query, json)?;
        }
        Commands::Labels { zoom } => run_labels(&mut ViewportController::new(&config)?, zoom),
        Commands::Moderate { text } => {
            run_moderate(&ContentModerator::from_config(&config)?, &text).await?;
        }
        Commands::List {
            category,
            region,
            sort,
            limit,
            json,
        } => {
            let mut session = connect(config, cli.offline)?;
            run_list(
                &mut session,
                category.as_deref(),
                region.as_deref(),
                sort.into(),
                limit,
                json,
            )
            .await?;
        }
        Commands::Add {
            lat,
            lng,
            category,
            urgency,
            title,
            tags,
            anonymous,
            description,
        } => {
            let args = AddArgs {
                coordinate: Coordinate::new(lat, lng),
                category,
                urgency: urgency.into(),
                title,
                tags,
                anonymous,
                description,
            };
            run_add(&mut connect(config, cli.offline)?, args).await?;
        }
        Commands::Delete { id } => run_delete(&mut connect(config, cli.offline)?, &id).await?,
        Commands::Stats { region } => {
            run_stats(&mut connect(config, cli.offline)?, region.as_deref()).await?;
        }
        Commands::Export {
            format,
            category,
            output,
        } => {
            let mut session = connect(config, cli.offline)?;
            run_export(&mut session, format, category.as_deref(), output.as_deref()).await?;
        }
    }

    Ok(())
}

fn connect(config: PulseConfig, offline: bool) -> Result<PulseSession<CliRemote>, CliError> {
    let runtime = RuntimeConfig::from_env()?;
    let remote = build_remote(&runtime, offline)?;
    open_session(config, remote, &runtime)
}
