//! Downloads on the local disk

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Writes exported audio where a browser download would have gone.
#[derive(Debug, Clone)]
pub struct TokioFileSystem {
    download_dir: PathBuf,
}

impl TokioFileSystem {
    /// Platform download folder, then `~/Downloads`, then the temp dir.
    pub fn new() -> Self {
        let download_dir = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(std::env::temp_dir);
        Self::with_download_directory(download_dir)
    }

    pub fn with_download_directory(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn download_directory(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.download_dir)
            .await
            .map_err(BridgeError::Io)?;
        Ok(self.download_dir.clone())
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(BridgeError::Io)?;
        }
        fs::write(path, &data).await.map_err(BridgeError::Io)?;

        debug!(path = ?path, bytes = data.len(), "Saved download");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        fs::read(path).await.map(Bytes::from).map_err(BridgeError::Io)
    }
}
