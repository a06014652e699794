//! Owner model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_record_id, to_payload};
use crate::error::Result;
use crate::sync::Payload;
use crate::util::non_blank;

/// Province recorded when the intake form leaves it blank
pub const DEFAULT_PROVINCE: &str = "BC";

/// Role a contact plays for the shelter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Adopter,
    Foster,
    Donor,
}

/// A person or household on file (adopter, foster, or donor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub full_name: Option<String>,
    pub phone_primary: Option<String>,
    pub email: Option<String>,
    pub phone_secondary: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: String,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub contact_type: Vec<ContactType>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    #[must_use]
    pub fn new(full_name: impl AsRef<str>) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            full_name: non_blank(full_name.as_ref()),
            phone_primary: None,
            email: None,
            phone_secondary: None,
            street_address: None,
            city: None,
            province: DEFAULT_PROVINCE.to_string(),
            postal_code: None,
            contact_type: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Single-line postal address, skipping blank parts
    pub fn address_line(&self) -> String {
        [
            self.street_address.as_deref(),
            self.city.as_deref(),
            Some(self.province.as_str()),
            self.postal_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    pub fn to_payload(&self) -> Result<Payload> {
        to_payload(self)
    }
}
