//! Pet model and intake status

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_record_id, to_payload};
use crate::error::{Error, Result};
use crate::sync::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

/// How the animal came into care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeType {
    Surrender,
    Stray,
    Found,
    Transfer,
}

/// Where a pet currently is in the shelter's care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    Intake,
    VetCheck,
    Available,
    Foster,
    Adopted,
    Deceased,
}

impl PetStatus {
    pub const ALL: [Self; 6] = [
        Self::Intake,
        Self::VetCheck,
        Self::Available,
        Self::Foster,
        Self::Adopted,
        Self::Deceased,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::VetCheck => "vet_check",
            Self::Available => "available",
            Self::Foster => "foster",
            Self::Adopted => "adopted",
            Self::Deceased => "deceased",
        }
    }

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intake => "Intake",
            Self::VetCheck => "Vet Check",
            Self::Available => "Available",
            Self::Foster => "Foster",
            Self::Adopted => "Adopted",
            Self::Deceased => "Deceased",
        }
    }

    /// Statuses a pet currently in `self` can be moved to
    pub fn choices(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |status| *status != self)
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| Error::InvalidInput(format!("unknown pet status '{value}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub species: Species,
    pub species_other: Option<String>,
    pub breed: Option<String>,
    pub age_years: Option<u32>,
    pub age_months: Option<u32>,
    pub sex: Option<Sex>,
    pub colour_markings: Option<String>,
    pub weight_lbs: Option<f64>,
    pub microchip_number: Option<String>,
    pub spayed_neutered: Option<bool>,
    pub intake_type: Option<IntakeType>,
    #[serde(default)]
    pub current_status: PetStatus,
    pub medical_notes: Option<String>,
    pub behavioural_notes: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// New pet at intake
    #[must_use]
    pub fn new(name: impl Into<String>, species: Species) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            owner_id: None,
            name: name.into().trim().to_string(),
            species,
            species_other: None,
            breed: None,
            age_years: None,
            age_months: None,
            sex: None,
            colour_markings: None,
            weight_lbs: None,
            microchip_number: None,
            spayed_neutered: None,
            intake_type: None,
            current_status: PetStatus::Intake,
            medical_notes: None,
            behavioural_notes: None,
            photo_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_payload(&self) -> Result<Payload> {
        to_payload(self)
    }
}
