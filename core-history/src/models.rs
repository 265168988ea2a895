//! History entry model
//!
//! Wire format matches the blob written by the web client:
//! `{"id","summaryText","audioData","createdAt","bookmarked"}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HistoryError, Result};

/// One generated briefing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// UUID v4 for new entries; older blobs use millisecond timestamps.
    pub id: String,

    pub summary_text: String,

    /// Transport payload (base64 PCM)
    pub audio_data: String,

    /// RFC 3339 on the wire
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub bookmarked: bool,
}

impl HistoryEntry {
    /// Create an entry with a fresh id.
    ///
    /// # Errors
    ///
    /// [`HistoryError::IncompleteEntry`] if either text or audio is empty.
    pub fn new(
        summary_text: impl Into<String>,
        audio_data: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let entry = Self {
            id: Uuid::new_v4().to_string(),
            summary_text: summary_text.into(),
            audio_data: audio_data.into(),
            created_at,
            bookmarked: false,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<()> {
        if self.summary_text.trim().is_empty() {
            return Err(HistoryError::IncompleteEntry("summary text"));
        }
        if self.audio_data.trim().is_empty() {
            return Err(HistoryError::IncompleteEntry("audio data"));
        }
        Ok(())
    }

    /// First `max_chars` characters of the summary, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.summary_text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head.trim_end())
        } else {
            head
        }
    }
}
