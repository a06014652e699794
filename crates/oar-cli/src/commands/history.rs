use chrono::{DateTime, Utc};
use oar_core::config::ClientConfig;
use oar_core::models::StatusLogEntry;
use oar_core::remote::PostgrestRemoteStore;

use crate::error::CliError;

pub async fn run_history(pet_id: &str, as_json: bool, config: &ClientConfig) -> Result<(), CliError> {
    config.require_remote()?;
    let remote = PostgrestRemoteStore::from_config(config)?;
    let history = StatusLogEntry::fetch_for_pet(&remote, pet_id.trim()).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No status history for {}", pet_id.trim());
        return Ok(());
    }
    for line in format_history_lines(&history) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_history_lines(history: &[StatusLogEntry]) -> Vec<String> {
    history
        .iter()
        .map(|entry| {
            let mut line = format!(
                "{}  {:<16}",
                format_timestamp(entry.changed_at),
                entry.status.label()
            );
            if let Some(by) = &entry.changed_by {
                line = format!("{line} by {by}");
            }
            match &entry.notes {
                Some(notes) => format!("{}  {notes}", line.trim_end()),
                None => line.trim_end().to_string(),
            }
        })
        .collect()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}
