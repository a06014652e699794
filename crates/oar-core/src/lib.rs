//! oar-core - Core library for Oar
//!
//! This crate contains the offline write queue, the sync engine that replays
//! it against Supabase, and the shelter domain models shared by the Oar
//! interfaces.

pub mod config;
pub mod connectivity;
pub mod db;
pub mod drafts;
pub mod error;
pub mod models;
pub mod remote;
pub mod settings;
pub mod storage;
pub mod sync;
pub mod util;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use sync::{SyncService, SyncSnapshot, SyncStatus};
