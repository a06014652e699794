//! Connectivity monitoring.
//!
//! Reachability reports arrive from the platform (or [`HttpReachabilityProbe`])
//! and the monitor turns each transition into online into a flush trigger.

mod probe;

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

pub use probe::HttpReachabilityProbe;

use crate::remote::RemoteStore;
use crate::storage::KeyValueStore;
use crate::sync::{FlushReport, SyncService};

/// One reachability report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reachability {
    pub is_connected: bool,
    /// `None` while the platform has not determined reachability yet
    pub is_internet_reachable: Option<bool>,
}

impl Reachability {
    pub const fn online() -> Self {
        Self {
            is_connected: true,
            is_internet_reachable: Some(true),
        }
    }

    pub const fn offline() -> Self {
        Self {
            is_connected: false,
            is_internet_reachable: Some(false),
        }
    }

    /// Connected and not known to be unreachable.
    pub const fn is_online(&self) -> bool {
        self.is_connected && !matches!(self.is_internet_reachable, Some(false))
    }
}

/// Change in the online flag caused by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
    Unchanged,
}

/// Tracks the online flag and triggers flushes when it turns on
#[derive(Debug, Default)]
pub struct ConnectivityMonitor {
    online: AtomicBool,
}

impl ConnectivityMonitor {
    /// Monitor starting offline, so the first online report counts as a
    /// transition.
    pub const fn new() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a report and return the resulting transition.
    pub fn observe(&self, reachability: Reachability) -> Transition {
        let online = reachability.is_online();
        let was_online = self.online.swap(online, Ordering::SeqCst);
        match (was_online, online) {
            (false, true) => Transition::CameOnline,
            (true, false) => Transition::WentOffline,
            _ => Transition::Unchanged,
        }
    }

    /// Apply a report to the service, flushing on a transition into online.
    pub async fn handle<S, R>(
        &self,
        service: &SyncService<S, R>,
        reachability: Reachability,
    ) -> Option<FlushReport>
    where
        S: KeyValueStore,
        R: RemoteStore,
    {
        let transition = self.observe(reachability);
        service.set_online(reachability.is_online());

        match transition {
            Transition::CameOnline => {
                tracing::info!("Connectivity restored; flushing sync queue");
                service.trigger_flush().await
            }
            Transition::WentOffline => {
                tracing::info!("Connectivity lost; queueing writes");
                None
            }
            Transition::Unchanged => None,
        }
    }

    /// Consume reachability reports until the sender is dropped.
    ///
    /// The receiver's current value is handled first.
    pub async fn run<S, R>(
        &self,
        service: &SyncService<S, R>,
        mut receiver: watch::Receiver<Reachability>,
    ) where
        S: KeyValueStore,
        R: RemoteStore,
    {
        let initial = *receiver.borrow_and_update();
        self.handle(service, initial).await;

        while receiver.changed().await.is_ok() {
            let reachability = *receiver.borrow_and_update();
            self.handle(service, reachability).await;
        }
        tracing::debug!("Reachability source closed; connectivity monitor stopping");
    }
}
