//! Storage Abstractions
//!
//! Two narrow capabilities: a string key-value store for the history blob
//! (the browser's `localStorage`), and a place to drop exported audio files
//! (the browser's download folder).

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Destination for user-visible downloads.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn save_wav(fs: &dyn FileSystemAccess, wav: Bytes) -> Result<PathBuf> {
///     let path = fs.download_directory().await?.join("summary.mp3");
///     fs.write_file(&path, wav).await?;
///     Ok(path)
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Directory downloads go to when the user has not picked one.
    async fn download_directory(&self) -> Result<PathBuf>;

    /// Create or replace `path`, creating missing parent directories.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    async fn read_file(&self, path: &Path) -> Result<Bytes>;
}

/// String key-value persistence.
///
/// Values are opaque; the history is stored as one JSON array under a
/// single key. Writes replace the previous value atomically.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_is_object_safe() {
        let store: Box<dyn SettingsStore> = Box::<MapStore>::default();

        store.set("audioSummaryHistory", "[]").await.unwrap();
        assert_eq!(
            store.get("audioSummaryHistory").await.unwrap().as_deref(),
            Some("[]")
        );

        store.remove("audioSummaryHistory").await.unwrap();
        store.remove("audioSummaryHistory").await.unwrap();
        assert_eq!(store.get("audioSummaryHistory").await.unwrap(), None);
    }
}
