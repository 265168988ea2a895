//! SQLite key-value store

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use tracing::debug;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
"#;

/// Desktop stand-in for `localStorage`, kept in one SQLite file.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

fn storage_error(action: &str, e: sqlx::Error) -> BridgeError {
    BridgeError::StorageError(format!("{}: {}", action, e))
}

impl SqliteSettingsStore {
    /// Open (or create) the database at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Cannot open settings database", e))?;

        let store = Self::with_pool(pool).await?;
        debug!(path = ?db_path, "Opened settings database");
        Ok(store)
    }

    /// Private in-memory database, dropped with the store.
    pub async fn in_memory() -> Result<Self> {
        // One connection, or each query would see its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| storage_error("Cannot open in-memory database", e))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| storage_error("Cannot create kv_store table", e))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Cannot read value", e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Cannot write value", e))?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Cannot remove value", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        assert_eq!(store.get("audioSummaryHistory").await.unwrap(), None);

        store.set("audioSummaryHistory", "[]").await.unwrap();
        store.set("audioSummaryHistory", "[{}]").await.unwrap();
        assert_eq!(
            store.get("audioSummaryHistory").await.unwrap().as_deref(),
            Some("[{}]")
        );

        store.remove("audioSummaryHistory").await.unwrap();
        store.remove("audioSummaryHistory").await.unwrap();
        assert_eq!(store.get("audioSummaryHistory").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_large_blob() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        let blob = "A".repeat(2 * 1024 * 1024);

        store.set("big", &blob).await.unwrap();
        assert_eq!(store.get("big").await.unwrap().map(|v| v.len()), Some(blob.len()));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let path = std::env::temp_dir()
            .join(format!("briefing-settings-{}", std::process::id()))
            .join("settings.db");
        let _ = tokio::fs::remove_file(&path).await;

        {
            let store = SqliteSettingsStore::new(path.clone()).await.unwrap();
            store.set("audioSummaryHistory", "[]").await.unwrap();
        }

        let reopened = SqliteSettingsStore::new(path.clone()).await.unwrap();
        assert_eq!(
            reopened.get("audioSummaryHistory").await.unwrap().as_deref(),
            Some("[]")
        );

        let _ = tokio::fs::remove_file(&path).await;
    }
}
