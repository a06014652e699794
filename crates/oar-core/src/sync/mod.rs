//! Offline write queue and synchronization.
//!
//! Writes that can't reach the remote store are appended to a durable queue
//! ([`QueueStore::enqueue`]). The [`SyncEngine`] replays the queue in order
//! when triggered, and the [`SyncStatusProjector`] turns queue length and the
//! last flush outcome into the synced/pending/error indicator.

mod diagnostics;
mod engine;
mod enqueue;
mod queue_store;
mod record;
mod service;
mod status;

pub use diagnostics::{DiagnosticSink, SyncDiagnostic, TracingDiagnostics};
pub use engine::{FlushReport, SyncEngine, MAX_RETRIES};
pub use queue_store::{QueueStore, QUEUE_KEY, QUEUE_SCHEMA_VERSION};
pub use record::{MutationId, MutationRecord, Payload, SyncOperation, SyncTable};
pub use service::{SyncService, WriteOutcome};
pub use status::{SyncSnapshot, SyncStatus, SyncStatusProjector};

