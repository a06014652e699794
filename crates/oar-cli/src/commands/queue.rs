use std::path::Path;

use chrono::Utc;

use crate::commands::common::{format_queue_lines, open_queue, queue_to_list_item, QueueListItem};
use crate::error::CliError;

pub async fn run_queue(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let records = open_queue(db_path).await?.load().await;
    let now = Utc::now();

    if as_json {
        let json_items = records
            .iter()
            .map(|record| queue_to_list_item(record, now))
            .collect::<Vec<QueueListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    for line in format_queue_lines(&records, now) {
        println!("{line}");
    }
    Ok(())
}
