//! Admin settings kept in local storage.

use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::util::non_blank;

/// Key holding the Google Sheets spreadsheet id used for exports
pub const SHEET_ID_KEY: &str = "oar:google_sheet_id";

pub struct SettingsStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Configured spreadsheet id, if any
    pub async fn sheet_id(&self) -> Result<Option<String>> {
        let value = self.storage.get(SHEET_ID_KEY).await?;
        Ok(value.as_deref().and_then(non_blank))
    }

    /// Store a spreadsheet id; a blank value clears it.
    ///
    /// Returns the value actually stored.
    pub async fn set_sheet_id(&self, sheet_id: &str) -> Result<Option<String>> {
        match non_blank(sheet_id) {
            Some(value) => {
                self.storage.set(SHEET_ID_KEY, &value).await?;
                tracing::info!("Spreadsheet id updated");
                Ok(Some(value))
            }
            None => {
                self.clear_sheet_id().await?;
                Ok(None)
            }
        }
    }

    pub async fn clear_sheet_id(&self) -> Result<()> {
        self.storage.remove(SHEET_ID_KEY).await?;
        tracing::info!("Spreadsheet id cleared");
        Ok(())
    }
}
