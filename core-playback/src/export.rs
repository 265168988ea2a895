//! Downloadable audio artifact.

use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PlaybackError, Result};

/// MIME type of every export; the encoder only writes WAV.
pub const WAV_CONTENT_TYPE: &str = "audio/wav";

/// An encoded file ready to be offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExport {
    /// Suggested file name (defaults to `summary.mp3` even though the content is WAV)
    pub file_name: String,
    /// MIME type of `data`
    pub content_type: &'static str,
    /// Complete WAV file
    pub data: Bytes,
}

impl AudioExport {
    pub fn wav(file_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: WAV_CONTENT_TYPE,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the file into `dir`, replacing any previous export of the same name.
    pub async fn save_to(&self, fs: &dyn FileSystemAccess, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs.write_file(&path, self.data.clone())
            .await
            .map_err(|e| PlaybackError::ExportFailed(e.to_string()))?;

        info!(file = %self.file_name, size = self.data.len(), "Saved audio export");
        Ok(path)
    }
}
