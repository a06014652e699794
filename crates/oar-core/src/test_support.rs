//! Fakes shared by unit tests across modules.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{Notify, Semaphore};

use crate::error::{Error, Result};
use crate::remote::{RemoteError, RemoteResult, RemoteStore};
use crate::storage::{KeyValueStore, MemoryKeyValueStore};
use crate::sync::{Payload, SyncTable};

pub fn payload(value: Value) -> Payload {
    value
        .as_object()
        .cloned()
        .expect("test payloads are JSON objects")
}

/// Memory store with switchable read/write failures and a write counter
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("disk I/O error")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("database or disk is full")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("database or disk is full")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}

/// Remote call as observed by [`StubRemote`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Upsert(SyncTable, Payload),
    Update(SyncTable, String, Payload),
    Delete(SyncTable, String),
}

impl RemoteCall {
    const fn table(&self) -> SyncTable {
        match self {
            Self::Upsert(table, _) | Self::Update(table, _, _) | Self::Delete(table, _) => *table,
        }
    }
}

#[derive(Default)]
struct StubState {
    calls: Vec<RemoteCall>,
    fail_always: bool,
    fail_next: usize,
    failing_tables: Vec<SyncTable>,
    rows: Vec<(SyncTable, Payload)>,
}

/// Scriptable in-process remote store
#[derive(Clone, Default)]
pub struct StubRemote {
    state: Arc<Mutex<StubState>>,
    gate: Arc<Mutex<Option<CallGate>>>,
}

impl StubRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_always(&self, fail: bool) {
        self.state.lock().unwrap().fail_always = fail;
    }

    /// Fail the next `count` calls, then succeed
    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().fail_next = count;
    }

    pub fn fail_table(&self, table: SyncTable) {
        self.state.lock().unwrap().failing_tables.push(table);
    }

    /// Seed a row that `select_eq` can return
    pub fn push_row(&self, table: SyncTable, row: Payload) {
        self.state.lock().unwrap().rows.push((table, row));
    }

    /// Block every call until released through the returned gate
    pub fn hold_calls(&self) -> CallGate {
        let gate = CallGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Successful and failed calls, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    async fn record(&self, call: RemoteCall) -> RemoteResult<()> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.permits
                .acquire()
                .await
                .expect("gate semaphore stays open")
                .forget();
        }

        let mut state = self.state.lock().unwrap();
        let fail = if state.fail_next > 0 {
            state.fail_next -= 1;
            true
        } else {
            state.fail_always || state.failing_tables.contains(&call.table())
        };

        if fail {
            return Err(RemoteError::Unavailable("stubbed failure".to_string()));
        }
        state.calls.push(call);
        Ok(())
    }
}

impl RemoteStore for StubRemote {
    async fn upsert(&self, table: SyncTable, row: &Payload) -> RemoteResult<()> {
        self.record(RemoteCall::Upsert(table, row.clone())).await
    }

    async fn update(&self, table: SyncTable, id: &str, fields: &Payload) -> RemoteResult<()> {
        self.record(RemoteCall::Update(table, id.to_string(), fields.clone()))
            .await
    }

    async fn delete(&self, table: SyncTable, id: &str) -> RemoteResult<()> {
        self.record(RemoteCall::Delete(table, id.to_string())).await
    }

    async fn select_eq(
        &self,
        table: SyncTable,
        column: &str,
        value: &str,
    ) -> RemoteResult<Vec<Payload>> {
        let state = self.state.lock().unwrap();
        if state.fail_always {
            return Err(RemoteError::Unavailable("stubbed failure".to_string()));
        }
        Ok(state
            .rows
            .iter()
            .filter(|(row_table, row)| {
                *row_table == table && row.get(column).and_then(Value::as_str) == Some(value)
            })
            .map(|(_, row)| row.clone())
            .collect())
    }
}

/// Lets a test pause remote calls mid-flush
#[derive(Clone)]
pub struct CallGate {
    entered: Arc<Notify>,
    permits: Arc<Semaphore>,
}

impl Default for CallGate {
    fn default() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            permits: Arc::new(Semaphore::new(0)),
        }
    }
}

impl CallGate {
    /// Resolves once a call is waiting at the gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self, calls: usize) {
        self.permits.add_permits(calls);
    }
}
