use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use oar_core::config::ClientConfig;
use oar_core::db::Database;
use oar_core::remote::PostgrestRemoteStore;
use oar_core::storage::LibSqlKeyValueStore;
use oar_core::sync::{FlushReport, MutationRecord, Payload, QueueStore, SyncService, SyncSnapshot};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

pub type CliSyncService = SyncService<LibSqlKeyValueStore, PostgrestRemoteStore>;

#[derive(Debug, Serialize)]
pub struct QueueListItem {
    pub id: String,
    pub table: String,
    pub operation: String,
    pub retries: u32,
    pub created_at: DateTime<Utc>,
    pub age: String,
}

pub fn queue_to_list_item(record: &MutationRecord, now: DateTime<Utc>) -> QueueListItem {
    QueueListItem {
        id: record.id.to_string(),
        table: record.table.to_string(),
        operation: record.operation.to_string(),
        retries: record.retries,
        created_at: record.created_at,
        age: format_relative_time(record.created_at, now),
    }
}

pub fn format_queue_lines(records: &[MutationRecord], now: DateTime<Utc>) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let short_id: String = record.id.as_str().chars().take(13).collect();
            let retries = if record.retries == 0 {
                String::new()
            } else {
                format!(" (retried {}x)", record.retries)
            };
            format!(
                "{short_id}  {:<7} {:<12} {}{retries}",
                record.operation.as_str(),
                record.table.as_str(),
                format_relative_time(record.created_at, now)
            )
        })
        .collect()
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now
        .signed_duration_since(timestamp)
        .num_milliseconds()
        .max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn format_flush_report(report: &FlushReport) -> String {
    if report.dropped > 0 {
        format!(
            "Synced {}, failed {}, dropped {} after repeated failures",
            report.succeeded, report.failed, report.dropped
        )
    } else {
        format!("Synced {}, failed {}", report.succeeded, report.failed)
    }
}

pub fn format_snapshot(snapshot: &SyncSnapshot) -> String {
    let network = if snapshot.is_online { "online" } else { "offline" };
    let line = format!(
        "{} ({} pending, {network})",
        snapshot.status.as_str(),
        snapshot.pending_count
    );
    match snapshot.banner_message() {
        Some(banner) => format!("{line} - {banner}"),
        None => line,
    }
}

pub fn parse_payload(raw: &str) -> Result<Payload, CliError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|error| CliError::InvalidPayload(error.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::PayloadNotObject),
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oar")
        .join("oar.db")
}

pub async fn open_storage(path: &Path) -> Result<LibSqlKeyValueStore, CliError> {
    let db = Database::open(path).await?;
    Ok(LibSqlKeyValueStore::new(db))
}

pub async fn open_queue(path: &Path) -> Result<QueueStore<LibSqlKeyValueStore>, CliError> {
    Ok(QueueStore::new(open_storage(path).await?))
}

pub async fn open_service(path: &Path, config: &ClientConfig) -> Result<CliSyncService, CliError> {
    config.require_remote()?;
    let remote = PostgrestRemoteStore::from_config(config)?;
    let service = SyncService::new(open_storage(path).await?, remote);
    service.initialize().await;
    Ok(service)
}
