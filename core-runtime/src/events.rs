//! # Events
//!
//! The briefing service, the playback controller and the history store
//! publish [`CoreEvent`]s on a shared [`EventBus`] so hosts can update their
//! UI without polling.
//!
//! The bus is a `tokio::sync::broadcast` channel: every subscriber sees
//! every event published after it subscribed. A subscriber that falls more
//! than the channel capacity behind gets `RecvError::Lagged(n)` and then
//! resumes with the oldest retained event. Publishing with no subscribers
//! returns `Err`, which publishers ignore.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, HistoryEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut ui = bus.subscribe();
//!
//! bus.emit(CoreEvent::History(HistoryEvent::Cleared)).ok();
//! assert_eq!(ui.recv().await.unwrap().description(), "History cleared");
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use tokio::sync::broadcast::Receiver;

/// Per-subscriber backlog before `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Everything published on the bus, grouped by the component that emits it.
///
/// Serialized as `{"type": "Playback", "payload": {"event": "Ready", ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Summary and speech generation
    Briefing(BriefingEvent),
    /// Playback controller transitions
    Playback(PlaybackEvent),
    /// History list changes
    History(HistoryEvent),
}

impl CoreEvent {
    /// Short label for status lines and logs.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Briefing(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::History(e) => e.description(),
        }
    }

    /// How loudly a host should surface this event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Briefing(BriefingEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::History(HistoryEvent::PersistenceFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Briefing(BriefingEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Ready { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Ordered from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    /// Shown to the user.
    Error,
}

// ============================================================================
// Briefing Events
// ============================================================================

/// Progress of one article → summary → speech run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BriefingEvent {
    /// Summary requested from the generation service.
    SummaryRequested {
        /// Requested summary length label.
        length: String,
        /// Article size in characters.
        article_chars: usize,
    },
    /// Summary text received.
    SummaryReady {
        /// Summary size in characters.
        summary_chars: usize,
    },
    /// Speech synthesis requested for the summary.
    SpeechRequested,
    /// Speech payload received.
    SpeechReady {
        /// Length of the base64 transport payload.
        payload_len: usize,
    },
    /// The briefing was stored in history and handed to the player.
    Completed {
        /// History entry id.
        entry_id: String,
    },
    /// Generation failed; nothing was stored.
    Failed {
        /// Stage that failed (`summary` or `speech`).
        stage: String,
        /// Error text, already safe to display.
        message: String,
    },
}

impl BriefingEvent {
    fn description(&self) -> &str {
        match self {
            BriefingEvent::SummaryRequested { .. } => "Summary requested",
            BriefingEvent::SummaryReady { .. } => "Summary received",
            BriefingEvent::SpeechRequested => "Speech requested",
            BriefingEvent::SpeechReady { .. } => "Speech received",
            BriefingEvent::Completed { .. } => "Briefing ready",
            BriefingEvent::Failed { .. } => "Briefing failed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new payload is being decoded.
    Preparing {
        /// Load request token.
        request: u64,
    },
    /// Decoding finished and the buffer is ready to play.
    Ready {
        /// Load request token.
        request: u64,
        /// Decoded frame count.
        frame_count: u64,
        /// Buffer duration (milliseconds).
        duration_ms: u64,
    },
    /// A decode result arrived after a newer load and was discarded.
    Superseded {
        /// The stale request token.
        request: u64,
    },
    /// A playback session started.
    Started {
        /// Engine session id.
        session_id: String,
    },
    /// A playback session was stopped before its end.
    Stopped {
        /// Engine session id.
        session_id: String,
    },
    /// A playback session reached the end of the buffer.
    Completed {
        /// Engine session id.
        session_id: String,
    },
    /// Decoding or output failed.
    Error {
        message: String,
        /// Whether the same operation may succeed if repeated.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Preparing { .. } => "Preparing audio",
            PlaybackEvent::Ready { .. } => "Audio ready",
            PlaybackEvent::Superseded { .. } => "Stale audio discarded",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Playback completed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// History Events
// ============================================================================

/// Changes to the stored briefing history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum HistoryEvent {
    /// History was read from storage.
    Loaded {
        /// Number of entries.
        count: usize,
    },
    /// A new entry was prepended.
    EntryAdded {
        /// Entry id.
        entry_id: String,
    },
    /// An entry's bookmark flag flipped.
    BookmarkToggled {
        /// Entry id.
        entry_id: String,
        /// New flag value.
        bookmarked: bool,
    },
    /// An entry was removed.
    EntryDeleted {
        /// Entry id.
        entry_id: String,
    },
    /// All entries were removed.
    Cleared,
    /// Writing the history blob failed; in-memory state is unchanged.
    PersistenceFailed {
        /// Storage error text, e.g. a quota failure.
        message: String,
    },
}

impl HistoryEvent {
    fn description(&self) -> &str {
        match self {
            HistoryEvent::Loaded { .. } => "History loaded",
            HistoryEvent::EntryAdded { .. } => "History entry added",
            HistoryEvent::BookmarkToggled { .. } => "Bookmark toggled",
            HistoryEvent::EntryDeleted { .. } => "History entry deleted",
            HistoryEvent::Cleared => "History cleared",
            HistoryEvent::PersistenceFailed { .. } => "History not saved",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Cloneable publisher handle; clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to current subscribers. Returns how many received it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Drain whatever is queued on `receiver` without waiting, skipping over
/// lag gaps.
pub fn drain(receiver: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}
