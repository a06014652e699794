//! Status history and status changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{new_record_id, to_payload, Pet, PetStatus};
use crate::error::{Error, Result};
use crate::remote::RemoteStore;
use crate::sync::{Payload, SyncOperation, SyncTable};
use crate::util::non_blank;

/// One row of a pet's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub id: String,
    pub pet_id: String,
    pub status: PetStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
}

impl StatusLogEntry {
    pub fn to_payload(&self) -> Result<Payload> {
        to_payload(self)
    }

    /// A pet's status history from the remote store, newest first.
    ///
    /// Reads go straight to the remote; changes still sitting in the local
    /// queue are not included.
    pub async fn fetch_for_pet<R: RemoteStore>(remote: &R, pet_id: &str) -> Result<Vec<Self>> {
        let rows = remote
            .select_eq(SyncTable::StatusLog, "pet_id", pet_id)
            .await?;
        let mut entries = rows
            .into_iter()
            .map(|row| serde_json::from_value::<Self>(Value::Object(row)))
            .collect::<serde_json::Result<Vec<_>>>()?;
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }
}

/// A write ready to be handed to the sync service
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub table: SyncTable,
    pub operation: SyncOperation,
    pub payload: Payload,
}

/// Moving a pet from one status to another.
///
/// A change updates the pet row and appends to the status log, so it expands
/// into two writes that are queued back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub pet_id: String,
    pub from: PetStatus,
    pub to: PetStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
}

impl StatusChange {
    pub fn new(pet_id: impl Into<String>, from: PetStatus, to: PetStatus) -> Result<Self> {
        if from == to {
            return Err(Error::InvalidInput(format!("pet is already '{to}'")));
        }
        let pet_id = pet_id.into();
        if pet_id.trim().is_empty() {
            return Err(Error::InvalidInput("pet id must not be empty".to_string()));
        }
        Ok(Self {
            pet_id,
            from,
            to,
            changed_at: Utc::now(),
            changed_by: None,
            notes: None,
        })
    }

    pub fn for_pet(pet: &Pet, to: PetStatus) -> Result<Self> {
        Self::new(pet.id.clone(), pet.current_status, to)
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl AsRef<str>) -> Self {
        self.notes = non_blank(notes.as_ref());
        self
    }

    #[must_use]
    pub fn changed_by(mut self, user_id: impl AsRef<str>) -> Self {
        self.changed_by = non_blank(user_id.as_ref());
        self
    }

    pub fn log_entry(&self) -> StatusLogEntry {
        StatusLogEntry {
            id: new_record_id(),
            pet_id: self.pet_id.clone(),
            status: self.to,
            changed_at: self.changed_at,
            changed_by: self.changed_by.clone(),
            notes: self.notes.clone(),
        }
    }

    /// The pet update followed by the status log insert
    pub fn writes(&self) -> Result<[PendingWrite; 2]> {
        let mut pet_update = Payload::new();
        pet_update.insert("id".to_string(), Value::String(self.pet_id.clone()));
        pet_update.insert("current_status".to_string(), json!(self.to));
        pet_update.insert("updated_at".to_string(), json!(self.changed_at));

        Ok([
            PendingWrite {
                table: SyncTable::Pets,
                operation: SyncOperation::Update,
                payload: pet_update,
            },
            PendingWrite {
                table: SyncTable::StatusLog,
                operation: SyncOperation::Insert,
                payload: self.log_entry().to_payload()?,
            },
        ])
    }
}
