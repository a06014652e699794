//! Sync engine: drains the queue against the remote store.
//!
//! Each pass works on the snapshot it read at start. A record gets exactly
//! one apply attempt per pass; failures bump `retries`, and a record whose
//! retries reach [`MAX_RETRIES`] is dropped. Only one pass runs at a time;
//! triggers that arrive while a pass is running fold into a single follow-up
//! pass.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex, MutexGuard};

use super::diagnostics::SyncDiagnostic;
use super::queue_store::QueueStore;
use super::record::{MutationId, MutationRecord, SyncOperation};
use crate::remote::{RemoteError, RemoteResult, RemoteStore};
use crate::storage::KeyValueStore;

/// Failed attempts after which a record is discarded
pub const MAX_RETRIES: u32 = 5;

/// Outcome counts of one flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub succeeded: usize,
    /// Records whose apply failed this pass, dropped ones included
    pub failed: usize,
    /// Records discarded this pass after reaching the retry ceiling
    pub dropped: usize,
}

impl FlushReport {
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Add the counts of a later pass to this one
    pub fn absorb(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.dropped += other.dropped;
    }
}

pub struct SyncEngine<S, R> {
    queue: Arc<QueueStore<S>>,
    remote: R,
    flush_lock: Mutex<()>,
    rerun_requested: AtomicBool,
    last_report: watch::Sender<Option<FlushReport>>,
}

impl<S: KeyValueStore, R: RemoteStore> SyncEngine<S, R> {
    pub fn new(queue: Arc<QueueStore<S>>, remote: R) -> Self {
        Self {
            queue,
            remote,
            flush_lock: Mutex::new(()),
            rerun_requested: AtomicBool::new(false),
            last_report: watch::Sender::new(None),
        }
    }

    pub fn queue(&self) -> &QueueStore<S> {
        &self.queue
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Combined report of the most recent completed flush, if any
    pub fn last_report(&self) -> Option<FlushReport> {
        *self.last_report.borrow()
    }

    /// Run one flush pass, waiting for an in-flight pass to finish first.
    pub async fn flush_queue(&self) -> FlushReport {
        let guard = self.flush_lock.lock().await;
        self.run_exclusive(guard).await
    }

    /// Run a flush pass unless one is already running.
    ///
    /// When a pass is in flight the trigger is folded into one follow-up pass
    /// run by the current holder, and `None` is returned.
    pub async fn trigger_flush(&self) -> Option<FlushReport> {
        // Raised before trying the lock so a holder that is just finishing
        // always sees it on its re-check.
        self.rerun_requested.store(true, Ordering::SeqCst);
        if let Ok(guard) = self.flush_lock.try_lock() {
            Some(self.run_exclusive(guard).await)
        } else {
            tracing::debug!("Flush already in flight; coalescing trigger");
            None
        }
    }

    /// Run a pass plus any follow-up passes requested meanwhile.
    ///
    /// The returned report, also published as [`Self::last_report`], sums
    /// every pass this call ran.
    async fn run_exclusive(&self, guard: MutexGuard<'_, ()>) -> FlushReport {
        self.rerun_requested.store(false, Ordering::SeqCst);
        let mut total = self.run_pass().await;
        drop(guard);

        while self.rerun_requested.load(Ordering::SeqCst) {
            // Whoever holds the lock now started after the request and covers it.
            let Ok(guard) = self.flush_lock.try_lock() else {
                break;
            };
            self.rerun_requested.store(false, Ordering::SeqCst);
            total.absorb(self.run_pass().await);
            drop(guard);
        }

        self.last_report.send_replace(Some(total));
        total
    }

    async fn run_pass(&self) -> FlushReport {
        let snapshot = {
            let _slot = self.queue.lock_slot().await;
            self.queue.load().await
        };

        if snapshot.is_empty() {
            return FlushReport::default();
        }

        tracing::info!(records = snapshot.len(), "Flushing sync queue");
        let snapshot_ids: HashSet<MutationId> =
            snapshot.iter().map(|record| record.id.clone()).collect();

        let mut report = FlushReport::default();
        let mut remaining = Vec::with_capacity(snapshot.len());

        for mut record in snapshot {
            match self.apply(&record).await {
                Ok(()) => {
                    tracing::debug!(
                        record_id = %record.id,
                        table = %record.table,
                        operation = %record.operation,
                        "Applied queued mutation"
                    );
                    report.succeeded += 1;
                }
                Err(error) => {
                    record.retries += 1;
                    report.failed += 1;
                    self.queue.report(SyncDiagnostic::ApplyFailed {
                        record_id: record.id.clone(),
                        table: record.table,
                        operation: record.operation,
                        retries: record.retries,
                        permanent: error.is_permanent(),
                        error: error.to_string(),
                    });

                    if record.retries < MAX_RETRIES {
                        remaining.push(record);
                    } else {
                        report.dropped += 1;
                        self.queue.report(SyncDiagnostic::RecordDropped {
                            record_id: record.id,
                            table: record.table,
                            operation: record.operation,
                            retries: record.retries,
                        });
                    }
                }
            }
        }

        {
            let _slot = self.queue.lock_slot().await;
            // Keep anything enqueued while this pass was talking to the remote.
            let arrived = self
                .queue
                .load()
                .await
                .into_iter()
                .filter(|record| !snapshot_ids.contains(&record.id));
            remaining.extend(arrived);
            self.queue.save(&remaining).await;
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            dropped = report.dropped,
            pending = remaining.len(),
            "Flush pass complete"
        );
        report
    }

    /// Apply one record to the remote store
    pub async fn apply(&self, record: &MutationRecord) -> RemoteResult<()> {
        match record.operation {
            SyncOperation::Insert => self.remote.upsert(record.table, &record.payload).await,
            SyncOperation::Update => {
                let id = required_id(record)?;
                self.remote
                    .update(record.table, &id, &record.fields_without_id())
                    .await
            }
            SyncOperation::Delete => {
                let id = required_id(record)?;
                self.remote.delete(record.table, &id).await
            }
        }
    }
}

fn required_id(record: &MutationRecord) -> RemoteResult<String> {
    record.target_id().ok_or(RemoteError::MissingId {
        table: record.table,
        operation: record.operation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::sync::diagnostics::recording::RecordingDiagnostics;
    use crate::sync::SyncTable;
    use crate::test_support::{payload, FlakyStore, RemoteCall, StubRemote};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn engine_with(
        storage: MemoryKeyValueStore,
        remote: StubRemote,
    ) -> SyncEngine<MemoryKeyValueStore, StubRemote> {
        SyncEngine::new(Arc::new(QueueStore::new(storage)), remote)
    }

    #[tokio::test]
    async fn empty_queue_flush_is_a_no_op_without_writes() {
        let storage = FlakyStore::new();
        let engine = SyncEngine::new(Arc::new(QueueStore::new(storage.clone())), StubRemote::new());

        let report = engine.flush_queue().await;

        assert_eq!(report, FlushReport::default());
        assert_eq!(storage.write_count(), 0);
        assert!(engine.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn applies_each_operation_with_its_remote_call() {
        let remote = StubRemote::new();
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        let queue = engine.queue();

        queue
            .enqueue(SyncTable::Owners, SyncOperation::Insert, payload(json!({"full_name": "Ana"})))
            .await;
        queue
            .enqueue(
                SyncTable::Pets,
                SyncOperation::Update,
                payload(json!({"id": "p1", "current_status": "available"})),
            )
            .await;
        queue
            .enqueue(SyncTable::Vaccinations, SyncOperation::Delete, payload(json!({"id": 12})))
            .await;

        let report = engine.flush_queue().await;

        assert_eq!(
            report,
            FlushReport {
                succeeded: 3,
                failed: 0,
                dropped: 0
            }
        );
        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::Upsert(SyncTable::Owners, payload(json!({"full_name": "Ana"}))),
                RemoteCall::Update(
                    SyncTable::Pets,
                    "p1".to_string(),
                    payload(json!({"current_status": "available"}))
                ),
                RemoteCall::Delete(SyncTable::Vaccinations, "12".to_string()),
            ]
        );
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn always_failing_record_is_dropped_after_fifth_pass() {
        let remote = StubRemote::new();
        remote.fail_always(true);
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        engine
            .queue()
            .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "Mo"})))
            .await;

        for pass in 1..=MAX_RETRIES {
            let report = engine.flush_queue().await;
            assert_eq!(report.failed, 1, "pass {pass}");
            assert_eq!(report.succeeded, 0, "pass {pass}");

            let queue = engine.queue().load().await;
            if pass < MAX_RETRIES {
                assert_eq!(queue.len(), 1, "pass {pass}");
                assert_eq!(queue[0].retries, pass, "pass {pass}");
                assert_eq!(report.dropped, 0, "pass {pass}");
            } else {
                assert!(queue.is_empty());
                assert_eq!(report.dropped, 1);
            }
        }

        let report = engine.flush_queue().await;
        assert_eq!(report, FlushReport::default());
        assert_eq!(remote.calls().len(), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn record_succeeding_on_third_attempt_is_counted_once() {
        let remote = StubRemote::new();
        remote.fail_next(2);
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        engine
            .queue()
            .enqueue(SyncTable::Owners, SyncOperation::Insert, payload(json!({"full_name": "Bo"})))
            .await;

        assert_eq!(engine.flush_queue().await.failed, 1);
        assert_eq!(engine.flush_queue().await.failed, 1);

        let report = engine.flush_queue().await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 0);
        assert!(engine.queue().is_empty().await);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_pass() {
        let remote = StubRemote::new();
        remote.fail_table(SyncTable::Owners);
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        let queue = engine.queue();

        queue
            .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "A"})))
            .await;
        let failing = queue
            .enqueue(SyncTable::Owners, SyncOperation::Insert, payload(json!({"full_name": "B"})))
            .await
            .unwrap();
        queue
            .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "C"})))
            .await;

        let report = engine.flush_queue().await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        let remaining = queue.load().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, failing);
        assert_eq!(remaining[0].retries, 1);
    }

    #[tokio::test]
    async fn update_without_id_exhausts_retries() {
        let remote = StubRemote::new();
        let sink = Arc::new(RecordingDiagnostics::default());
        let queue = Arc::new(QueueStore::with_diagnostics(
            MemoryKeyValueStore::new(),
            sink.clone(),
        ));
        let engine = SyncEngine::new(queue.clone(), remote.clone());
        queue
            .enqueue(SyncTable::Pets, SyncOperation::Update, payload(json!({"name": "NoId"})))
            .await;

        for _ in 0..MAX_RETRIES {
            let report = engine.flush_queue().await;
            assert_eq!(report.failed, 1);
        }

        assert!(queue.is_empty().await);
        assert!(remote.calls().is_empty());
        let permanent_failures = sink
            .events()
            .iter()
            .filter(|event| matches!(event, SyncDiagnostic::ApplyFailed { permanent: true, .. }))
            .count();
        assert_eq!(permanent_failures, MAX_RETRIES as usize);
        assert!(sink
            .events()
            .iter()
            .any(|event| matches!(event, SyncDiagnostic::RecordDropped { retries: 5, .. })));
    }

    #[tokio::test]
    async fn overlapping_triggers_coalesce_and_keep_new_records() {
        let remote = StubRemote::new();
        let gate = remote.hold_calls();
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        engine
            .queue()
            .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "first"})))
            .await;

        let (first, second) = tokio::join!(engine.trigger_flush(), async {
            gate.entered().await;
            engine
                .queue()
                .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "late"})))
                .await;
            let coalesced = engine.trigger_flush().await;
            gate.release(10);
            coalesced
        });

        assert!(second.is_none());
        assert_eq!(first.map(|report| report.succeeded), Some(2));
        assert!(engine.queue().is_empty().await);
        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::Upsert(SyncTable::Pets, payload(json!({"name": "first"}))),
                RemoteCall::Upsert(SyncTable::Pets, payload(json!({"name": "late"}))),
            ]
        );
    }

    #[tokio::test]
    async fn coalesced_follow_up_adds_to_the_callers_report() {
        let remote = StubRemote::new();
        remote.fail_table(SyncTable::Owners);
        let gate = remote.hold_calls();
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        for name in ["Biscuit", "Juniper", "Mo"] {
            engine
                .queue()
                .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({ "name": name })))
                .await;
        }

        let (first, second) = tokio::join!(engine.trigger_flush(), async {
            gate.entered().await;
            engine
                .queue()
                .enqueue(SyncTable::Owners, SyncOperation::Insert, payload(json!({"full_name": "Ana"})))
                .await;
            let coalesced = engine.trigger_flush().await;
            gate.release(10);
            coalesced
        });

        let expected = FlushReport {
            succeeded: 3,
            failed: 1,
            dropped: 0,
        };
        assert!(second.is_none());
        assert_eq!(first, Some(expected));
        assert_eq!(engine.last_report(), Some(expected));

        let remaining = engine.queue().load().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].table, SyncTable::Owners);
        assert_eq!(remaining[0].retries, 1);
    }

    #[tokio::test]
    async fn empty_follow_up_keeps_the_first_pass_counts() {
        let remote = StubRemote::new();
        let gate = remote.hold_calls();
        let engine = engine_with(MemoryKeyValueStore::new(), remote.clone());
        for name in ["Biscuit", "Juniper", "Mo"] {
            engine
                .queue()
                .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({ "name": name })))
                .await;
        }

        let (first, second) = tokio::join!(engine.trigger_flush(), async {
            gate.entered().await;
            let coalesced = engine.trigger_flush().await;
            gate.release(10);
            coalesced
        });

        assert!(second.is_none());
        assert_eq!(first.map(|report| report.succeeded), Some(3));
        assert_eq!(remote.calls().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn trigger_racing_a_finishing_pass_is_never_lost() {
        for round in 0..200 {
            let engine = Arc::new(engine_with(MemoryKeyValueStore::new(), StubRemote::new()));
            engine
                .queue()
                .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "early"})))
                .await;

            let first = tokio::spawn({
                let engine = engine.clone();
                async move { engine.trigger_flush().await }
            });
            let second = tokio::spawn({
                let engine = engine.clone();
                async move {
                    engine
                        .queue()
                        .enqueue(SyncTable::Pets, SyncOperation::Insert, payload(json!({"name": "late"})))
                        .await;
                    engine.trigger_flush().await
                }
            });
            first.await.unwrap();
            second.await.unwrap();

            assert!(engine.queue().is_empty().await, "round {round}");
        }
    }

    #[tokio::test]
    async fn last_report_tracks_latest_pass() {
        let engine = engine_with(MemoryKeyValueStore::new(), StubRemote::new());
        assert_eq!(engine.last_report(), None);

        engine.flush_queue().await;
        assert_eq!(engine.last_report(), Some(FlushReport::default()));
    }
}
