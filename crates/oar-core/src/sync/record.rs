//! Mutation record model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;

/// Field map sent to the remote store
pub type Payload = serde_json::Map<String, Value>;

/// Logical collections that accept queued writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTable {
    Owners,
    Pets,
    Vaccinations,
    StatusLog,
}

impl SyncTable {
    pub const ALL: [Self; 4] = [Self::Owners, Self::Pets, Self::Vaccinations, Self::StatusLog];

    /// Remote table name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owners => "owners",
            Self::Pets => "pets",
            Self::Vaccinations => "vaccinations",
            Self::StatusLog => "status_log",
        }
    }
}

impl fmt::Display for SyncTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("unknown table '{s}'")))
    }
}

/// Kind of write a record replays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Insert,
    Update,
    Delete,
}

impl SyncOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether the payload must carry the target row's `id`
    pub const fn requires_id(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidInput(format!("unknown operation '{other}'"))),
        }
    }
}

/// Queue-local identifier for a mutation record.
///
/// New ids are UUID v7 strings (millisecond timestamp + random bits), so they
/// sort by enqueue time. Any string is accepted when loading older queues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(String);

impl MutationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MutationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single pending write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub id: MutationId,
    pub table: SyncTable,
    pub operation: SyncOperation,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    /// Failed apply attempts so far
    pub retries: u32,
}

impl MutationRecord {
    /// Create a fresh record stamped with the current time
    #[must_use]
    pub fn new(table: SyncTable, operation: SyncOperation, payload: Payload) -> Self {
        Self {
            id: MutationId::new(),
            table,
            operation,
            payload,
            created_at: Utc::now(),
            retries: 0,
        }
    }

    /// Target row id for update/delete.
    ///
    /// String ids are returned as-is; numeric ids are rendered in decimal.
    /// Missing, null, empty, or non-scalar ids yield `None`.
    pub fn target_id(&self) -> Option<String> {
        match self.payload.get("id")? {
            Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Payload without the `id` key, used as the partial update body
    pub fn fields_without_id(&self) -> Payload {
        self.payload
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
