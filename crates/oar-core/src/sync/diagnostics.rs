//! Structured reporting for failures the sync layer recovers from.
//!
//! Nothing here reaches the user; sinks exist so operators can notice
//! corrupt local state or records that keep failing.

use std::fmt;

use super::record::{MutationId, SyncOperation, SyncTable};

/// A recovered failure or notable event inside the sync layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDiagnostic {
    /// Storage refused the read; the queue was treated as empty
    QueueReadFailed { error: String },
    /// The stored blob did not parse; the queue was treated as empty
    QueueCorrupt { error: String },
    /// The stored blob was written by a newer schema
    UnsupportedQueueVersion { version: u32 },
    /// Storage refused the write; in-memory and durable state may diverge
    QueueWriteFailed { error: String },
    /// Update/delete queued without a usable `id`
    MalformedPayload {
        record_id: MutationId,
        table: SyncTable,
        operation: SyncOperation,
    },
    /// One apply attempt failed
    ApplyFailed {
        record_id: MutationId,
        table: SyncTable,
        operation: SyncOperation,
        retries: u32,
        permanent: bool,
        error: String,
    },
    /// A record exhausted its retries and was discarded
    RecordDropped {
        record_id: MutationId,
        table: SyncTable,
        operation: SyncOperation,
        retries: u32,
    },
}

impl fmt::Display for SyncDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueReadFailed { error } => write!(f, "sync queue read failed: {error}"),
            Self::QueueCorrupt { error } => write!(f, "sync queue is corrupt: {error}"),
            Self::UnsupportedQueueVersion { version } => {
                write!(f, "sync queue has unsupported version {version}")
            }
            Self::QueueWriteFailed { error } => write!(f, "sync queue write failed: {error}"),
            Self::MalformedPayload {
                record_id,
                table,
                operation,
            } => write!(
                f,
                "{operation} on {table} queued without an id (record {record_id})"
            ),
            Self::ApplyFailed {
                record_id,
                retries,
                error,
                ..
            } => write!(f, "apply failed for {record_id} (attempt {retries}): {error}"),
            Self::RecordDropped {
                record_id, retries, ..
            } => write!(f, "dropped {record_id} after {retries} failed attempts"),
        }
    }
}

/// Receiver for sync diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: SyncDiagnostic);
}

/// Default sink: structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: SyncDiagnostic) {
        match &diagnostic {
            SyncDiagnostic::ApplyFailed {
                record_id,
                table,
                operation,
                retries,
                permanent,
                error,
            } => tracing::warn!(
                record_id = %record_id,
                table = %table,
                operation = %operation,
                retries,
                permanent,
                "Sync failed for item: {error}"
            ),
            SyncDiagnostic::RecordDropped {
                record_id,
                table,
                operation,
                retries,
            } => tracing::warn!(
                record_id = %record_id,
                table = %table,
                operation = %operation,
                retries,
                "Dropping queued mutation after exhausting retries"
            ),
            other => tracing::warn!("{other}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::{DiagnosticSink, SyncDiagnostic};

    /// Sink that keeps every diagnostic for assertions
    #[derive(Default)]
    pub struct RecordingDiagnostics {
        events: Mutex<Vec<SyncDiagnostic>>,
    }

    impl RecordingDiagnostics {
        pub fn events(&self) -> Vec<SyncDiagnostic> {
            self.events.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingDiagnostics {
        fn report(&self, diagnostic: SyncDiagnostic) {
            self.events.lock().unwrap().push(diagnostic);
        }
    }
}
