//! Remote store contract.
//!
//! The hosted backend owns schema and query semantics; the sync engine only
//! needs upsert, partial update, and delete keyed by record id.

mod postgrest;

pub use postgrest::PostgrestRemoteStore;

use thiserror::Error;

use crate::sync::{Payload, SyncOperation, SyncTable};

/// Errors returned by a remote store call
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {message} ({status})")]
    Api { status: u16, message: String },
    #[error("{operation} on {table} requires an `id` in the payload")]
    MissingId {
        table: SyncTable,
        operation: SyncOperation,
    },
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Whether retrying the same call can never succeed.
    ///
    /// Permanent failures still go through the normal retry ceiling; this is
    /// only used to label diagnostics.
    pub const fn is_permanent(&self) -> bool {
        match self {
            Self::MissingId { .. } | Self::InvalidConfiguration(_) => true,
            Self::Api { status, .. } => *status == 400 || *status == 404 || *status == 422,
            Self::Http(_) | Self::Unavailable(_) => false,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Trait for remote table operations (async)
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Insert `row`, or merge it into the existing row with the same identity
    async fn upsert(&self, table: SyncTable, row: &Payload) -> RemoteResult<()>;

    /// Apply `fields` as a partial update to the row with `id`
    async fn update(&self, table: SyncTable, id: &str, fields: &Payload) -> RemoteResult<()>;

    /// Delete the row with `id`
    async fn delete(&self, table: SyncTable, id: &str) -> RemoteResult<()>;

    /// Fetch rows whose `column` equals `value`
    async fn select_eq(
        &self,
        table: SyncTable,
        column: &str,
        value: &str,
    ) -> RemoteResult<Vec<Payload>>;
}
