//! Durable queue store.
//!
//! The whole queue lives in one storage slot and is always read and written
//! in full. Reads never fail: a missing, unreadable, or unparsable slot is an
//! empty queue, and the cause goes to the diagnostics sink.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use super::diagnostics::{DiagnosticSink, SyncDiagnostic, TracingDiagnostics};
use super::record::MutationRecord;
use crate::storage::KeyValueStore;

/// Storage key for the sync queue
pub const QUEUE_KEY: &str = "oar:sync_queue";

/// Envelope version written by this build
pub const QUEUE_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct QueueEnvelopeRef<'a> {
    version: u32,
    records: &'a [MutationRecord],
}

#[derive(Deserialize)]
struct QueueEnvelope {
    version: u32,
    records: Value,
}

/// Persists the ordered list of pending mutations
pub struct QueueStore<S> {
    storage: S,
    diagnostics: Arc<dyn DiagnosticSink>,
    // Serializes read-modify-write sequences on the slot.
    slot_lock: Mutex<()>,
}

impl<S: KeyValueStore> QueueStore<S> {
    /// Create a store reporting through `tracing`
    pub fn new(storage: S) -> Self {
        Self::with_diagnostics(storage, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(storage: S, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            storage,
            diagnostics,
            slot_lock: Mutex::new(()),
        }
    }

    /// Load the persisted queue in insertion order
    pub async fn load(&self) -> Vec<MutationRecord> {
        let raw = match self.storage.get(QUEUE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                self.report(SyncDiagnostic::QueueReadFailed {
                    error: error.to_string(),
                });
                return Vec::new();
            }
        };

        match decode_queue(&raw) {
            Ok(records) => records,
            Err(diagnostic) => {
                self.report(diagnostic);
                Vec::new()
            }
        }
    }

    /// Replace the persisted queue with `records`.
    ///
    /// Returns `false` when the write did not happen; the cause has already
    /// been reported, so best-effort callers may ignore the result.
    pub async fn save(&self, records: &[MutationRecord]) -> bool {
        let encoded = match encode_queue(records) {
            Ok(encoded) => encoded,
            Err(error) => {
                self.report(SyncDiagnostic::QueueWriteFailed {
                    error: error.to_string(),
                });
                return false;
            }
        };

        match self.storage.set(QUEUE_KEY, &encoded).await {
            Ok(()) => true,
            Err(error) => {
                self.report(SyncDiagnostic::QueueWriteFailed {
                    error: error.to_string(),
                });
                false
            }
        }
    }

    /// Number of records currently persisted
    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Underlying storage, shared with drafts and settings
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) async fn lock_slot(&self) -> MutexGuard<'_, ()> {
        self.slot_lock.lock().await
    }

    pub(crate) fn report(&self, diagnostic: SyncDiagnostic) {
        self.diagnostics.report(diagnostic);
    }
}

fn encode_queue(records: &[MutationRecord]) -> serde_json::Result<String> {
    serde_json::to_string(&QueueEnvelopeRef {
        version: QUEUE_SCHEMA_VERSION,
        records,
    })
}

/// Decode either the versioned envelope or the bare array written before
/// the queue carried a version.
fn decode_queue(raw: &str) -> Result<Vec<MutationRecord>, SyncDiagnostic> {
    let corrupt = |error: serde_json::Error| SyncDiagnostic::QueueCorrupt {
        error: error.to_string(),
    };

    let value: Value = serde_json::from_str(raw).map_err(corrupt)?;
    if value.is_array() {
        return serde_json::from_value(value).map_err(corrupt);
    }

    let envelope: QueueEnvelope = serde_json::from_value(value).map_err(corrupt)?;
    if envelope.version != QUEUE_SCHEMA_VERSION {
        return Err(SyncDiagnostic::UnsupportedQueueVersion {
            version: envelope.version,
        });
    }
    serde_json::from_value(envelope.records).map_err(corrupt)
}
