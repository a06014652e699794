use std::path::Path;

use oar_core::models::{PetStatus, StatusChange};

use crate::commands::common::open_queue;
use crate::error::CliError;

pub async fn run_pet_status(
    pet_id: &str,
    from: &str,
    to: &str,
    notes: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let from: PetStatus = from.parse()?;
    let to: PetStatus = to.parse()?;
    let mut change = StatusChange::new(pet_id.trim(), from, to)?;
    if let Some(notes) = notes {
        change = change.with_notes(notes);
    }

    let queue = open_queue(db_path).await?;
    for write in change.writes()? {
        let id = queue
            .enqueue(write.table, write.operation, write.payload)
            .await
            .ok_or(CliError::QueueWriteFailed)?;
        println!("{id}  {} {}", write.operation, write.table);
    }
    println!("{}: {} -> {}", change.pet_id, from.label(), to.label());
    Ok(())
}
