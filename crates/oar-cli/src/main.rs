//! Oar CLI - drive the offline write queue from the command line
//!
//! Queue mutations, inspect what is pending, and replay the queue against
//! Supabase once or whenever connectivity returns.

mod cli;
mod commands;
mod error;


use clap::Parser;
use oar_core::config::ClientConfig;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::draft::run_draft;
use crate::commands::enqueue::run_enqueue;
use crate::commands::history::run_history;
use crate::commands::pet_status::run_pet_status;
use crate::commands::queue::run_queue;
use crate::commands::sheet_id::run_sheet_id;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
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
    for directive in ["oar=info", "oar_core=info"] {
        filter = filter.add_directive(directive.parse().map_err(|_| {
            oar_core::Error::Config(format!("invalid log directive '{directive}'"))
        })?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let db_path = resolve_db_path(cli.db_path, &config);
    tracing::debug!(db_path = %db_path.display(), "Using local database");

    match cli.command {
        Commands::Enqueue {
            table,
            operation,
            payload,
        } => run_enqueue(&table, &operation, &payload, &db_path).await?,
        Commands::Queue { json } => run_queue(json, &db_path).await?,
        Commands::Sync => run_sync(&db_path, &config).await?,
        Commands::Status { json } => run_status(json, &db_path, &config).await?,
        Commands::Watch { interval } => run_watch(interval, &db_path, &config).await?,
        Commands::PetStatus {
            pet_id,
            from,
            to,
            notes,
        } => run_pet_status(&pet_id, &from, &to, notes.as_deref(), &db_path).await?,
        Commands::History { pet_id, json } => run_history(&pet_id, json, &config).await?,
        Commands::Draft { command } => run_draft(command, &db_path).await?,
        Commands::SheetId { value, clear } => {
            run_sheet_id(value.as_deref(), clear, &db_path).await?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
