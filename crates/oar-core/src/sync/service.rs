//! Sync service: one explicit object owning the queue, engine, and status.
//!
//! Construct it once at startup and hand references to whatever needs it.

use std::sync::Arc;

use tokio::sync::watch;

use super::diagnostics::{DiagnosticSink, TracingDiagnostics};
use super::engine::{FlushReport, SyncEngine};
use super::queue_store::QueueStore;
use super::record::{MutationId, MutationRecord, Payload, SyncOperation, SyncTable};
use super::status::{SyncSnapshot, SyncStatusProjector};
use crate::models::PendingWrite;
use crate::remote::RemoteStore;
use crate::storage::KeyValueStore;

/// Result of a write that may go straight to the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The remote store accepted the write
    Applied,
    /// The write was queued for a later flush (`None` if storage dropped it)
    Queued(Option<MutationId>),
}

pub struct SyncService<S, R> {
    engine: SyncEngine<S, R>,
    projector: SyncStatusProjector,
}

impl<S: KeyValueStore, R: RemoteStore> SyncService<S, R> {
    pub fn new(storage: S, remote: R) -> Self {
        Self::with_diagnostics(storage, remote, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(storage: S, remote: R, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        let queue = Arc::new(QueueStore::with_diagnostics(storage, diagnostics));
        Self {
            engine: SyncEngine::new(queue, remote),
            projector: SyncStatusProjector::new(),
        }
    }

    /// Compute the initial status from whatever the queue holds on disk
    pub async fn initialize(&self) -> SyncSnapshot {
        let snapshot = self.refresh().await;
        tracing::info!(
            pending = snapshot.pending_count,
            status = snapshot.status.as_str(),
            "Sync service ready"
        );
        snapshot
    }

    pub const fn engine(&self) -> &SyncEngine<S, R> {
        &self.engine
    }

    pub fn queue(&self) -> &QueueStore<S> {
        self.engine.queue()
    }

    /// Queue a mutation and update the pending count
    pub async fn enqueue(
        &self,
        table: SyncTable,
        operation: SyncOperation,
        payload: Payload,
    ) -> Option<MutationId> {
        let id = self.queue().enqueue(table, operation, payload).await;
        self.refresh().await;
        id
    }

    /// Queue several writes in order, refreshing status once at the end
    pub async fn enqueue_all(
        &self,
        writes: impl IntoIterator<Item = PendingWrite>,
    ) -> Vec<Option<MutationId>> {
        let mut ids = Vec::new();
        for write in writes {
            ids.push(
                self.queue()
                    .enqueue(write.table, write.operation, write.payload)
                    .await,
            );
        }
        self.refresh().await;
        ids
    }

    /// Write directly when online, otherwise (or on failure) queue it
    pub async fn write_or_enqueue(
        &self,
        table: SyncTable,
        operation: SyncOperation,
        payload: Payload,
    ) -> WriteOutcome {
        if self.is_online() {
            let record = MutationRecord::new(table, operation, payload);
            match self.engine.apply(&record).await {
                Ok(()) => return WriteOutcome::Applied,
                Err(error) => {
                    tracing::warn!(
                        table = %table,
                        operation = %operation,
                        "Direct write failed, queueing instead: {error}"
                    );
                    return WriteOutcome::Queued(
                        self.enqueue(table, operation, record.payload).await,
                    );
                }
            }
        }

        WriteOutcome::Queued(self.enqueue(table, operation, payload).await)
    }

    /// Run a flush pass, waiting for any in-flight pass first
    pub async fn flush_queue(&self) -> FlushReport {
        let report = self.engine.flush_queue().await;
        self.refresh().await;
        report
    }

    /// Run a flush pass unless one is in flight (then it is coalesced)
    pub async fn trigger_flush(&self) -> Option<FlushReport> {
        let report = self.engine.trigger_flush().await;
        self.refresh().await;
        report
    }

    /// Manual sync request; does nothing while offline
    pub async fn sync_now(&self) -> Option<FlushReport> {
        if !self.is_online() {
            tracing::debug!("Ignoring sync request while offline");
            return None;
        }
        self.trigger_flush().await
    }

    /// Recompute status from the queue without flushing
    pub async fn refresh(&self) -> SyncSnapshot {
        let pending = self.queue().len().await;
        self.projector
            .project(pending, self.engine.last_report().as_ref())
    }

    pub fn set_online(&self, is_online: bool) {
        self.projector.set_online(is_online);
    }

    pub fn is_online(&self) -> bool {
        self.projector.snapshot().is_online
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.projector.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.projector.subscribe()
    }
}
