//! Form draft auto-save.
//!
//! In-progress form data is kept under `oar:draft:{key}` so nothing is lost
//! when the app is backgrounded. Drafts are best effort: storage and decode
//! failures are logged and otherwise ignored.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::KeyValueStore;

/// Key prefix shared by all drafts
pub const DRAFT_KEY_PREFIX: &str = "oar:draft:";

pub struct DraftStore<S> {
    storage: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage_key(key: &str) -> String {
        format!("{DRAFT_KEY_PREFIX}{key}")
    }

    pub async fn save<T: Serialize>(&self, key: &str, draft: &T) {
        let raw = match serde_json::to_string(draft) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(draft = key, "Failed to encode draft: {error}");
                return;
            }
        };
        if let Err(error) = self.storage.set(&Self::storage_key(key), &raw).await {
            tracing::warn!(draft = key, "Failed to save draft: {error}");
        }
    }

    /// Load a draft, `None` if absent or unreadable
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(error) => {
                tracing::warn!(draft = key, "Discarding unreadable draft: {error}");
                None
            }
        }
    }

    /// Stored JSON text of a draft
    pub async fn load_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(&Self::storage_key(key)).await {
            Ok(raw) => raw.filter(|raw| !raw.is_empty()),
            Err(error) => {
                tracing::warn!(draft = key, "Failed to read draft: {error}");
                None
            }
        }
    }

    pub async fn clear(&self, key: &str) {
        if let Err(error) = self.storage.remove(&Self::storage_key(key)).await {
            tracing::warn!(draft = key, "Failed to clear draft: {error}");
        }
    }
}
