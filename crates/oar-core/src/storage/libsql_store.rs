//! libSQL implementation of `KeyValueStore`

use std::sync::Arc;

use libsql::params;

use super::KeyValueStore;
use crate::db::Database;
use crate::error::Result;
use crate::util::now_millis;

/// Key-value store persisted in the local `kv_store` table
#[derive(Clone)]
pub struct LibSqlKeyValueStore {
    db: Arc<Database>,
}

impl LibSqlKeyValueStore {
    /// Create a store over an opened database
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Create a store sharing an already shared database
    pub const fn from_shared(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KeyValueStore for LibSqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .db
            .connection()
            .query("SELECT value FROM kv_store WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now_millis()],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .connection()
            .execute("DELETE FROM kv_store WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> LibSqlKeyValueStore {
        LibSqlKeyValueStore::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_missing_key() {
        let store = setup().await;
        assert_eq!(store.get("oar:missing").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_replaces_value() {
        let store = setup().await;
        store.set("oar:key", "first").await.unwrap();
        store.set("oar:key", "second").await.unwrap();

        assert_eq!(
            store.get("oar:key").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_remove() {
        let store = setup().await;
        store.set("oar:key", "value").await.unwrap();
        store.remove("oar:key").await.unwrap();
        store.remove("oar:key").await.unwrap();

        assert_eq!(store.get("oar:key").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_values_survive_reopen() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("oar.db");

        {
            let store = LibSqlKeyValueStore::new(Database::open(&db_path).await.unwrap());
            store.set("oar:key", "durable").await.unwrap();
        }

        let store = LibSqlKeyValueStore::new(Database::open(&db_path).await.unwrap());
        assert_eq!(
            store.get("oar:key").await.unwrap().as_deref(),
            Some("durable")
        );
    }
}
