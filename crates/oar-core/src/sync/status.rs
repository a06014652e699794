//! Derived sync status for presentation layers.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::engine::FlushReport;

/// Three-state sync indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Nothing waiting
    #[default]
    Synced,
    /// Records waiting and the last flush had no failures
    Pending,
    /// The last flush reported at least one failed record
    Error,
}

impl SyncStatus {
    /// Derive the status from the current queue length and the most recent
    /// flush outcome.
    pub const fn derive(pending_count: usize, last_flush: Option<&FlushReport>) -> Self {
        if let Some(report) = last_flush {
            if report.has_failures() {
                return Self::Error;
            }
        }
        if pending_count > 0 {
            Self::Pending
        } else {
            Self::Synced
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }
}

/// What the UI is allowed to see about the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    pub pending_count: usize,
    pub is_online: bool,
}

impl SyncSnapshot {
    /// Banner text, or `None` when there is nothing to show
    pub fn banner_message(&self) -> Option<String> {
        match self.status {
            SyncStatus::Synced => None,
            SyncStatus::Pending => Some(format!(
                "{} change{} pending sync",
                self.pending_count,
                if self.pending_count == 1 { "" } else { "s" }
            )),
            SyncStatus::Error => Some("Sync error - will retry".to_string()),
        }
    }
}

/// Publishes [`SyncSnapshot`] updates to subscribers
pub struct SyncStatusProjector {
    sender: watch::Sender<SyncSnapshot>,
}

impl SyncStatusProjector {
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(SyncSnapshot::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        *self.sender.borrow()
    }

    /// Recompute status and pending count, keeping the online flag
    pub fn project(&self, pending_count: usize, last_flush: Option<&FlushReport>) -> SyncSnapshot {
        let status = SyncStatus::derive(pending_count, last_flush);
        self.sender.send_if_modified(|snapshot| {
            let changed = snapshot.status != status || snapshot.pending_count != pending_count;
            snapshot.status = status;
            snapshot.pending_count = pending_count;
            changed
        });
        self.snapshot()
    }

    pub fn set_online(&self, is_online: bool) {
        self.sender.send_if_modified(|snapshot| {
            let changed = snapshot.is_online != is_online;
            snapshot.is_online = is_online;
            changed
        });
    }
}

impl Default for SyncStatusProjector {
    fn default() -> Self {
        Self::new()
    }
}
