use std::path::Path;
use std::time::Duration;

use oar_core::config::ClientConfig;
use oar_core::connectivity::{ConnectivityMonitor, HttpReachabilityProbe, Reachability};
use tokio::sync::watch;

use crate::commands::common::{format_snapshot, open_service};
use crate::error::CliError;

pub async fn run_watch(
    interval_secs: u64,
    db_path: &Path,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let url = config
        .reachability_probe_url()
        .ok_or(CliError::ReachabilityNotConfigured)?;
    let probe = HttpReachabilityProbe::new(url)?;
    let service = open_service(db_path, config).await?;
    let monitor = ConnectivityMonitor::new();

    println!("{}", format_snapshot(&service.snapshot()));
    println!("Watching {} every {interval_secs}s (Ctrl-C to stop)", probe.url());

    let (sender, receiver) = watch::channel(Reachability::offline());
    let mut updates = service.subscribe();
    let print_updates = async {
        while updates.changed().await.is_ok() {
            let snapshot = *updates.borrow_and_update();
            println!("{}", format_snapshot(&snapshot));
        }
    };

    tokio::select! {
        () = async {
            tokio::join!(
                probe.run(Duration::from_secs(interval_secs), sender),
                monitor.run(&service, receiver),
                print_updates,
            );
        } => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            println!("Stopped watching");
        }
    }
    Ok(())
}
