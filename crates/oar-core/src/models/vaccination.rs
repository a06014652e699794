//! Vaccination model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_record_id, to_payload};
use crate::error::Result;
use crate::sync::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationType {
    Rabies,
    Distemper,
    Bordetella,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccination {
    pub id: String,
    pub pet_id: String,
    #[serde(rename = "type")]
    pub kind: VaccinationType,
    pub date_given: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Vaccination {
    #[must_use]
    pub fn new(pet_id: impl Into<String>, kind: VaccinationType) -> Self {
        Self {
            id: new_record_id(),
            pet_id: pet_id.into(),
            kind,
            date_given: None,
            notes: None,
        }
    }

    pub fn to_payload(&self) -> Result<Payload> {
        to_payload(self)
    }
}
