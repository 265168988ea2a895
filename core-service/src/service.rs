//! # Briefing Service
//!
//! Orchestrates article → summary → speech → history → playback and exposes
//! the operations a host UI binds to.
//!
//! ## Workflow
//!
//! 1. [`BriefingService::generate`] asks the summary provider, then the
//!    speech provider. Nothing is stored unless both succeed.
//! 2. The briefing is prepended to history and its payload is loaded into
//!    the playback controller.
//! 3. Playback is driven through [`BriefingService::toggle_playback`] or
//!    keyboard shortcuts via [`BriefingService::handle_key`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_traits::error::BridgeError;
use bridge_traits::generation::{SpeechProvider, SummaryLength, SummaryProvider};
use bridge_traits::storage::FileSystemAccess;
use core_history::share::{self, SharePayload};
use core_history::{HistoryCursor, HistoryEntry, HistoryStore};
use core_playback::{
    PlaybackCommandSender, PlaybackController, PlaybackError, PlayerStatus,
    DEFAULT_COMMAND_CAPACITY,
};
use core_runtime::config::{AudioSettings, HistorySettings};
use core_runtime::events::{BriefingEvent, CoreEvent, EventBus, Receiver};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CoreError, Result, Stage};
use crate::input::{KeyEvent, Shortcut, ShortcutMapper};
use crate::CoreDependencies;

const EMPTY_SUMMARY: &str = "Could not generate summary from the article.";
const EMPTY_AUDIO: &str = "No audio data received from API.";

/// The briefing currently shown and loaded into the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Briefing {
    pub summary: String,
    /// History entry the briefing came from; `None` for opened share links.
    pub entry_id: Option<String>,
}

pub struct BriefingService {
    summary: Arc<dyn SummaryProvider>,
    speech: Arc<dyn SpeechProvider>,
    file_system: Arc<dyn FileSystemAccess>,
    history: Arc<HistoryStore>,
    controller: Arc<PlaybackController>,
    commands: PlaybackCommandSender,
    controller_task: Mutex<Option<JoinHandle<core_playback::Result<()>>>>,
    events: EventBus,
    current: Mutex<Option<Briefing>>,
    cursor: Mutex<HistoryCursor>,
    shortcuts: ShortcutMapper,
}

impl BriefingService {
    /// Load the saved history and start the playback controller loop.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn start(
        deps: CoreDependencies,
        audio: AudioSettings,
        history: HistorySettings,
        events: EventBus,
    ) -> Result<Self> {
        audio.validate()?;
        history.validate()?;

        let store = Arc::new(
            HistoryStore::new(deps.settings_store, &history).with_event_bus(events.clone()),
        );
        let count = store.load().await;

        let controller = Arc::new(
            PlaybackController::new(deps.audio_engine, audio).with_event_bus(events.clone()),
        );
        let (commands, task) = controller.spawn(DEFAULT_COMMAND_CAPACITY);

        info!(history_entries = count, "Briefing service started");

        Ok(Self {
            summary: deps.summary,
            speech: deps.speech,
            file_system: deps.file_system,
            history: store,
            controller,
            commands,
            controller_task: Mutex::new(Some(task)),
            events,
            current: Mutex::new(None),
            cursor: Mutex::new(HistoryCursor::new(count)),
            shortcuts: ShortcutMapper,
        })
    }

    fn emit(&self, event: BriefingEvent) {
        let _ = self.events.emit(CoreEvent::Briefing(event));
    }

    fn upstream(&self, stage: Stage, source: BridgeError) -> CoreError {
        error!(stage = %stage, error = %source, "Briefing generation failed");
        self.emit(BriefingEvent::Failed {
            stage: stage.to_string(),
            message: source.to_string(),
        });
        CoreError::Upstream { stage, source }
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Summarize `article`, synthesize the summary, save the briefing and
    /// load it into the player.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyArticle`] for blank input; no request is made
    /// - [`CoreError::Upstream`] when either request fails; history is left
    ///   untouched
    /// - [`CoreError::Playback`] when the payload cannot be decoded; the
    ///   entry stays in history
    #[instrument(skip(self, article), fields(article_chars = article.len(), length = %length))]
    pub async fn generate(&self, article: &str, length: SummaryLength) -> Result<HistoryEntry> {
        if article.trim().is_empty() {
            return Err(CoreError::EmptyArticle);
        }

        // A new run replaces whatever was shown.
        self.clear_current().await;

        self.emit(BriefingEvent::SummaryRequested {
            length: length.label().to_string(),
            article_chars: article.chars().count(),
        });
        let summary = self
            .summary
            .summarize(article, length)
            .await
            .map_err(|e| self.upstream(Stage::Summary, e))?;
        if summary.trim().is_empty() {
            return Err(self.upstream(
                Stage::Summary,
                BridgeError::OperationFailed(EMPTY_SUMMARY.to_string()),
            ));
        }
        self.emit(BriefingEvent::SummaryReady {
            summary_chars: summary.chars().count(),
        });

        self.emit(BriefingEvent::SpeechRequested);
        let audio = self
            .speech
            .synthesize(&summary)
            .await
            .map_err(|e| self.upstream(Stage::Speech, e))?;
        if audio.trim().is_empty() {
            return Err(self.upstream(
                Stage::Speech,
                BridgeError::OperationFailed(EMPTY_AUDIO.to_string()),
            ));
        }
        self.emit(BriefingEvent::SpeechReady {
            payload_len: audio.len(),
        });

        let entry = self.history.add(summary, audio).await?;
        self.reset_cursor().await;

        self.show(entry.summary_text.clone(), Some(entry.id.clone()), &entry.audio_data)
            .await?;

        info!(entry_id = %entry.id, "Briefing ready");
        self.emit(BriefingEvent::Completed {
            entry_id: entry.id.clone(),
        });
        Ok(entry)
    }

    async fn show(&self, summary: String, entry_id: Option<String>, audio: &str) -> Result<()> {
        *self.current.lock().await = Some(Briefing { summary, entry_id });

        if let Err(e) = self.controller.load(audio).await {
            warn!(error = %e, "Briefing audio could not be prepared");
            return Err(e.into());
        }
        Ok(())
    }

    /// Nothing stays playable once the shown briefing is gone.
    async fn clear_current(&self) {
        *self.current.lock().await = None;
        if self.controller.unload().await {
            debug!("Cleared previous briefing audio");
        }
    }

    // ========================================================================
    // Opening briefings
    // ========================================================================

    /// Show a saved briefing and load its audio.
    #[instrument(skip(self))]
    pub async fn open_entry(&self, id: &str) -> Result<HistoryEntry> {
        let entry = self
            .history
            .get(id)
            .await
            .ok_or_else(|| CoreError::EntryNotFound(id.to_string()))?;

        self.show(entry.summary_text.clone(), Some(entry.id.clone()), &entry.audio_data)
            .await?;
        debug!(entry_id = %entry.id, "Opened history entry");
        Ok(entry)
    }

    /// Show the briefing carried by a `#share=` fragment. Shared briefings
    /// are not added to history.
    #[instrument(skip(self, fragment))]
    pub async fn open_shared(&self, fragment: &str) -> Result<SharePayload> {
        let payload = share::parse_fragment(fragment)?;
        self.show(payload.summary.clone(), None, &payload.audio).await?;
        debug!("Opened shared briefing");
        Ok(payload)
    }

    /// Link that reopens entry `id` on another device.
    pub async fn share_link(&self, id: &str, base_url: &str) -> Result<String> {
        let entry = self
            .history
            .get(id)
            .await
            .ok_or_else(|| CoreError::EntryNotFound(id.to_string()))?;
        Ok(share::share_url(base_url, &SharePayload::from(&entry))?)
    }

    pub async fn current(&self) -> Option<Briefing> {
        self.current.lock().await.clone()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Queue a play/stop toggle on the controller loop.
    pub async fn toggle_playback(&self) -> Result<()> {
        self.commands.toggle().await?;
        Ok(())
    }

    /// Sender for hosts that drive the controller directly.
    pub fn commands(&self) -> PlaybackCommandSender {
        self.commands.clone()
    }

    pub async fn status(&self) -> PlayerStatus {
        self.controller.status().await
    }

    /// Write the current audio as a WAV file into `dir`, or into the
    /// platform download directory when `dir` is `None`.
    #[instrument(skip(self))]
    pub async fn save_audio(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let export = self.controller.export().await?;

        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .file_system
                .download_directory()
                .await
                .map_err(|e| PlaybackError::ExportFailed(e.to_string()))?,
        };

        let path = export.save_to(self.file_system.as_ref(), &dir).await?;
        info!(path = %path.display(), size = export.len(), "Audio saved");
        Ok(path)
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Apply a key press. Returns the shortcut it triggered, if any.
    ///
    /// [`Shortcut::SubmitArticle`] is returned for the host to act on, since
    /// the article text lives in the host's input field.
    pub async fn handle_key(&self, event: &KeyEvent) -> Result<Option<Shortcut>> {
        let has_audio = self.controller.status().await.ready;
        let Some(shortcut) = self.shortcuts.map(event, has_audio) else {
            return Ok(None);
        };

        match shortcut {
            Shortcut::TogglePlayback => {
                if let Some(command) = shortcut.to_command() {
                    self.commands.send(command).await?;
                }
            }
            Shortcut::SubmitArticle => {}
            Shortcut::HistoryNext => {
                self.cursor.lock().await.focus_next();
            }
            Shortcut::HistoryPrevious => {
                self.cursor.lock().await.focus_previous();
            }
            Shortcut::HistorySelect => {
                let selected = self.cursor.lock().await.select();
                if let Some(index) = selected {
                    let entries = self.history.list().await;
                    if let Some(entry) = entries.get(index) {
                        self.open_entry(&entry.id).await?;
                    }
                }
            }
        }

        Ok(Some(shortcut))
    }

    /// Index of the keyboard-focused history row.
    pub async fn focused_entry(&self) -> Option<usize> {
        self.cursor.lock().await.focused()
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    pub async fn toggle_bookmark(&self, id: &str) -> Result<bool> {
        self.history
            .toggle_bookmark(id)
            .await
            .ok_or_else(|| CoreError::EntryNotFound(id.to_string()))
    }

    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        if !self.history.delete(id).await {
            return Err(CoreError::EntryNotFound(id.to_string()));
        }
        self.reset_cursor().await;
        Ok(())
    }

    pub async fn clear_history(&self) {
        self.history.clear().await;
        self.reset_cursor().await;
    }

    async fn reset_cursor(&self) {
        let len = self.history.len().await;
        self.cursor.lock().await.reset(len);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Stop playback, release the audio engine and end the controller loop.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(task) = self.controller_task.lock().await.take() else {
            return Ok(());
        };

        if self.commands.shutdown().await.is_err() {
            debug!("Controller loop already stopped");
        }

        match task.await {
            Ok(result) => result?,
            Err(e) => return Err(PlaybackError::Internal(e.to_string()).into()),
        }

        info!("Briefing service shut down");
        Ok(())
    }
}
