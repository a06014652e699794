//! Shelter domain records.
//!
//! Each record mirrors a remote table row and converts into a queue payload
//! with `to_payload()`.

mod owner;
mod pet;
mod status_log;
mod vaccination;

pub use owner::{ContactType, Owner, DEFAULT_PROVINCE};
pub use pet::{IntakeType, Pet, PetStatus, Sex, Species};
pub use status_log::{PendingWrite, StatusChange, StatusLogEntry};
pub use vaccination::{Vaccination, VaccinationType};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::Payload;

/// New record id, time-sortable
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

fn to_payload<T: Serialize>(record: &T) -> Result<Payload> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput(format!(
            "record did not serialize to an object: {other}"
        ))),
    }
}
