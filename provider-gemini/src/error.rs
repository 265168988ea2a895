//! Error types for the Gemini provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Gemini provider errors
#[derive(Error, Debug)]
pub enum GeminiError {
    /// API request returned a non-success status
    #[error("Gemini API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The prompt was rejected before generation
    #[error("Request blocked by Gemini: {0}")]
    Blocked(String),

    /// Summary response carried no text
    #[error("Could not generate summary from the article.")]
    EmptySummary,

    /// Speech response carried no inline audio
    #[error("No audio data received from API.")]
    MissingAudio,

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

impl From<GeminiError> for BridgeError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
