use std::path::Path;

use oar_core::settings::SettingsStore;

use crate::commands::common::open_storage;
use crate::error::CliError;

pub async fn run_sheet_id(value: Option<&str>, clear: bool, db_path: &Path) -> Result<(), CliError> {
    let settings = SettingsStore::new(open_storage(db_path).await?);

    if clear {
        settings.clear_sheet_id().await?;
        println!("Spreadsheet id cleared.");
        return Ok(());
    }

    let current = match value {
        Some(value) => settings.set_sheet_id(value).await?,
        None => settings.sheet_id().await?,
    };
    match current {
        Some(sheet_id) => println!("{sheet_id}"),
        None => println!("No spreadsheet id configured."),
    }
    Ok(())
}
