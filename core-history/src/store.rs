//! History persistence
//!
//! The whole list is kept in memory and written back as one JSON array after
//! every mutation. Storage is best effort: read and write failures are
//! logged as warnings and published as [`HistoryEvent::PersistenceFailed`],
//! but never returned. The in-memory list stays authoritative.

use std::sync::Arc;

use bridge_traits::storage::SettingsStore;
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::config::HistorySettings;
use core_runtime::events::{CoreEvent, EventBus, HistoryEvent};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::HistoryEntry;

/// Newest-first briefing history backed by a [`SettingsStore`] key.
pub struct HistoryStore {
    settings: Arc<dyn SettingsStore>,
    key: String,
    clock: Arc<dyn Clock>,
    events: Option<EventBus>,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Create an empty store. Call [`load`](Self::load) to read saved entries.
    pub fn new(settings: Arc<dyn SettingsStore>, config: &HistorySettings) -> Self {
        Self {
            settings,
            key: config.storage_key.clone(),
            clock: Arc::new(SystemClock),
            events: None,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    fn emit(&self, event: HistoryEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::History(event));
        }
    }

    /// Replace the in-memory list with the stored one.
    ///
    /// A missing, unreadable or corrupt blob yields an empty history.
    /// Entries without text or audio are skipped.
    pub async fn load(&self) -> usize {
        let loaded = match self.settings.get(&self.key).await {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<HistoryEntry>>(&blob) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Stored history is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read history; starting empty");
                Vec::new()
            }
        };

        let total = loaded.len();
        let entries: Vec<HistoryEntry> = loaded
            .into_iter()
            .filter(|entry| entry.validate().is_ok())
            .collect();
        if entries.len() < total {
            warn!(skipped = total - entries.len(), "Skipped incomplete history entries");
        }

        let count = entries.len();
        *self.entries.write().await = entries;

        info!(count, "History loaded");
        self.emit(HistoryEvent::Loaded { count });
        count
    }

    async fn persist(&self, entries: &[HistoryEntry]) {
        let blob = match serde_json::to_string(entries) {
            Ok(blob) => blob,
            Err(e) => {
                self.persistence_failed(e.to_string());
                return;
            }
        };

        match self.settings.set(&self.key, &blob).await {
            Ok(()) => debug!(count = entries.len(), size = blob.len(), "History saved"),
            Err(e) => self.persistence_failed(e.to_string()),
        }
    }

    fn persistence_failed(&self, message: String) {
        warn!(key = %self.key, error = %message, "Failed to save history");
        self.emit(HistoryEvent::PersistenceFailed { message });
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Prepend a new entry.
    ///
    /// # Errors
    ///
    /// [`HistoryError::IncompleteEntry`](crate::HistoryError::IncompleteEntry)
    /// if `summary` or `audio` is empty.
    pub async fn add(&self, summary: impl Into<String>, audio: impl Into<String>) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(summary, audio, self.clock.now())?;

        let mut entries = self.entries.write().await;
        entries.insert(0, entry.clone());
        self.persist(&entries).await;
        drop(entries);

        debug!(entry_id = %entry.id, "History entry added");
        self.emit(HistoryEvent::EntryAdded {
            entry_id: entry.id.clone(),
        });
        Ok(entry)
    }

    /// Flip the bookmark flag. Returns the new value, or `None` for an
    /// unknown id.
    pub async fn toggle_bookmark(&self, id: &str) -> Option<bool> {
        let mut entries = self.entries.write().await;
        let entry = entries.iter_mut().find(|e| e.id == id)?;
        entry.bookmarked = !entry.bookmarked;
        let bookmarked = entry.bookmarked;
        self.persist(&entries).await;
        drop(entries);

        self.emit(HistoryEvent::BookmarkToggled {
            entry_id: id.to_string(),
            bookmarked,
        });
        Some(bookmarked)
    }

    /// Remove one entry. Returns `false` for an unknown id.
    pub async fn delete(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return false;
        }
        self.persist(&entries).await;
        drop(entries);

        self.emit(HistoryEvent::EntryDeleted {
            entry_id: id.to_string(),
        });
        true
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await;
        drop(entries);

        info!("History cleared");
        self.emit(HistoryEvent::Cleared);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    /// Bookmarked entries, newest first.
    pub async fn bookmarked(&self) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.bookmarked)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
