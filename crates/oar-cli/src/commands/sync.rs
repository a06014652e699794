use std::path::Path;

use oar_core::config::ClientConfig;

use crate::commands::common::{format_flush_report, open_service};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path, config: &ClientConfig) -> Result<(), CliError> {
    let service = open_service(db_path, config).await?;
    let report = service.flush_queue().await;

    println!("{}", format_flush_report(&report));
    if let Some(banner) = service.snapshot().banner_message() {
        println!("{banner}");
    }
    Ok(())
}
