//! Durable key-value storage shared by the sync queue, drafts, and settings.
//!
//! Every value is a string; callers own their serialization. Implementations
//! must survive process restart unless documented otherwise.

mod libsql_store;
mod memory;

pub use libsql_store::LibSqlKeyValueStore;
pub use memory::MemoryKeyValueStore;

use crate::error::Result;

/// Trait for string key-value storage operations (async)
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
