use std::path::Path;

use oar_core::drafts::DraftStore;
use serde_json::Value;

use crate::cli::DraftCommands;
use crate::commands::common::open_storage;
use crate::error::CliError;

pub async fn run_draft(command: DraftCommands, db_path: &Path) -> Result<(), CliError> {
    let drafts = DraftStore::new(open_storage(db_path).await?);

    match command {
        DraftCommands::Show { key } => match drafts.load::<Value>(&key).await {
            Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
            None => println!("No draft saved for '{key}'."),
        },
        DraftCommands::Clear { key } => {
            drafts.clear(&key).await;
            println!("Cleared draft '{key}'.");
        }
    }
    Ok(())
}
