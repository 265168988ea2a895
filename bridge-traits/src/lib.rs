//! # Host Bridge Traits
//!
//! Everything the briefing core needs from its host, as object-safe async
//! traits. The core holds each capability as an `Arc<dyn Trait>` and never
//! reaches for a global.
//!
//! | Capability | Used by |
//! |------------|---------|
//! | [`HttpClient`] | the Gemini connector |
//! | [`SummaryProvider`], [`SpeechProvider`] | the briefing service |
//! | [`AudioEngine`] | the playback controller |
//! | [`SettingsStore`] | the history store |
//! | [`FileSystemAccess`] | audio export |
//! | [`Clock`] | history timestamps |
//! | [`LoggerSink`] | optional log forwarding |
//!
//! Implementations convert their native failures into [`BridgeError`].
//! `bridge-desktop` provides the desktop set; tests use `mockall` mocks or
//! small in-crate fakes.

pub mod error;
pub mod generation;
pub mod http;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use generation::{SpeechProvider, SummaryLength, SummaryProvider};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use playback::{
    AudioEngine, EngineState, PcmFrames, PlaybackRequest, PlaybackSessionId, SessionEnded,
    SessionEndedSender,
};
pub use storage::{FileSystemAccess, SettingsStore};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
