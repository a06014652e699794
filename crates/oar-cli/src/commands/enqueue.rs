use std::path::Path;

use oar_core::sync::{SyncOperation, SyncTable};

use crate::commands::common::{open_queue, parse_payload};
use crate::error::CliError;

pub async fn run_enqueue(
    table: &str,
    operation: &str,
    payload: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let table: SyncTable = table.parse()?;
    let operation: SyncOperation = operation.parse()?;
    let payload = parse_payload(payload)?;

    let queue = open_queue(db_path).await?;
    let id = queue
        .enqueue(table, operation, payload)
        .await
        .ok_or(CliError::QueueWriteFailed)?;

    println!("{id}");
    Ok(())
}
