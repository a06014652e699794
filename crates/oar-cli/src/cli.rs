use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "oar")]
#[command(about = "Inspect and drive the Oar offline write queue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue a mutation for the next sync
    Enqueue {
        /// Target table (owners, pets, vaccinations, status_log)
        table: String,
        /// Operation (insert, update, delete)
        operation: String,
        /// Row payload as a JSON object
        payload: String,
    },
    /// List queued mutations
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay the queue against the remote store once
    Sync,
    /// Show the derived sync status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe connectivity and sync whenever the network comes back
    Watch {
        /// Seconds between reachability probes
        #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Queue a pet status change and its history entry
    PetStatus {
        /// Pet id
        pet_id: String,
        /// Current status
        from: String,
        /// New status
        to: String,
        /// Optional note stored with the history entry
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a pet's status history from the remote store
    History {
        /// Pet id
        pet_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect saved form drafts
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
    /// Show or set the export spreadsheet id
    SheetId {
        /// New spreadsheet id
        value: Option<String>,
        /// Remove the stored id
        #[arg(long, conflicts_with = "value")]
        clear: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Print a saved draft
    Show {
        /// Draft key, e.g. `pet:new`
        key: String,
    },
    /// Delete a saved draft
    Clear {
        /// Draft key
        key: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
