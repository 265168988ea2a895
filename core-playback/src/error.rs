//! # Playback Error Types
//!
//! Errors raised while turning a transport payload into sound or into a file.

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    // ========================================================================
    // Decode Errors
    // ========================================================================
    /// The transport payload is not valid base64.
    #[error("Invalid audio payload: {0}")]
    TransportDecode(String),

    /// The requested PCM layout is impossible (zero channels or zero rate).
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Attempted to play or export with no decoded buffer.
    #[error("No audio loaded")]
    NoAudioLoaded,

    /// The audio engine could not be initialized or refused a session.
    #[error("Audio output unavailable: {0}")]
    PlaybackResource(String),

    /// The controller loop has stopped and no longer accepts commands.
    #[error("Playback controller is closed")]
    ControllerClosed,

    // ========================================================================
    // Export Errors
    // ========================================================================
    /// Writing the exported file failed.
    #[error("Failed to save audio: {0}")]
    ExportFailed(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if repeating the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::PlaybackResource(_) | PlaybackError::ExportFailed(_)
        )
    }

    /// Returns `true` if the payload itself is unusable.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::TransportDecode(_) | PlaybackError::InvalidFormat(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
