//! Mutation enqueuer

use super::diagnostics::SyncDiagnostic;
use super::queue_store::QueueStore;
use super::record::{MutationId, MutationRecord, Payload, SyncOperation, SyncTable};
use crate::storage::KeyValueStore;

impl<S: KeyValueStore> QueueStore<S> {
    /// Append a new mutation to the end of the queue.
    ///
    /// Never fails visibly. Returns the new record's id once it is persisted,
    /// or `None` when storage dropped the write (already reported).
    /// Update/delete payloads without an `id` are still queued and reported
    /// as malformed; they fail on every apply until the retry ceiling.
    pub async fn enqueue(
        &self,
        table: SyncTable,
        operation: SyncOperation,
        payload: Payload,
    ) -> Option<MutationId> {
        let record = MutationRecord::new(table, operation, payload);
        let record_id = record.id.clone();

        if operation.requires_id() && record.target_id().is_none() {
            self.report(SyncDiagnostic::MalformedPayload {
                record_id: record_id.clone(),
                table,
                operation,
            });
        }

        let _slot = self.lock_slot().await;
        let mut queue = self.load().await;
        queue.push(record);

        if self.save(&queue).await {
            tracing::debug!(
                record_id = %record_id,
                table = %table,
                operation = %operation,
                pending = queue.len(),
                "Queued mutation"
            );
            Some(record_id)
        } else {
            None
        }
    }
}
