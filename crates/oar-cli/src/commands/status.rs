use std::path::Path;

use oar_core::config::ClientConfig;
use oar_core::connectivity::HttpReachabilityProbe;
use oar_core::sync::{SyncSnapshot, SyncStatus};

use crate::commands::common::{format_snapshot, open_queue};
use crate::error::CliError;

pub async fn run_status(as_json: bool, db_path: &Path, config: &ClientConfig) -> Result<(), CliError> {
    let pending_count = open_queue(db_path).await?.len().await;
    let is_online = match config.reachability_probe_url() {
        Some(url) => HttpReachabilityProbe::new(url)?.probe().await.is_online(),
        None => false,
    };

    // No flush has run in this process, so only pending/synced can show here.
    let snapshot = SyncSnapshot {
        status: SyncStatus::derive(pending_count, None),
        pending_count,
        is_online,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}
