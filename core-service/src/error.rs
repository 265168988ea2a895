use bridge_traits::error::BridgeError;
use core_history::HistoryError;
use core_playback::PlaybackError;
use thiserror::Error;

/// Failed generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Speech,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Summary => "summary",
            Stage::Speech => "speech",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Please paste an article first.")]
    EmptyArticle,

    #[error("History entry not found: {0}")]
    EntryNotFound(String),

    #[error("Upstream {stage} request failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: BridgeError,
    },

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            CoreError::EmptyArticle => "Please paste an article first.",
            CoreError::Upstream { .. } => "Failed to generate audio summary. Please try again.",
            CoreError::Playback(PlaybackError::NoAudioLoaded) => "No audio is loaded yet.",
            CoreError::Playback(PlaybackError::ExportFailed(_)) => "Could not save the audio file.",
            CoreError::Playback(_) => "Could not prepare audio.",
            CoreError::History(HistoryError::InvalidShareLink(_)) => "This share link is invalid.",
            CoreError::History(_) => "Could not save this summary.",
            CoreError::EntryNotFound(_) => "That summary is no longer in your history.",
            CoreError::InitializationFailed(_) | CoreError::Runtime(_) => {
                "The app is not configured correctly."
            }
        }
    }

    /// `true` for errors caused by user input or upstream services rather
    /// than by a misconfigured host.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            CoreError::InitializationFailed(_) | CoreError::Runtime(_)
        )
    }
}
