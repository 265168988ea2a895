//! Generation Service Abstractions
//!
//! Summarization and speech synthesis are provided by an external generative
//! AI service. The core depends only on these traits; concrete connectors live
//! in provider crates (e.g., `provider-gemini`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

/// Requested length of a generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    /// A single sentence.
    Short,
    /// One paragraph suitable for an audio briefing.
    #[default]
    Medium,
    /// Several paragraphs covering every main point.
    Long,
}

impl SummaryLength {
    /// All lengths, in the order they are offered to users.
    pub const ALL: [SummaryLength; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Prompt fragment describing the target length.
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryLength::Short => "into a single, concise sentence",
            SummaryLength::Medium => {
                "into a concise and clear paragraph, suitable for an audio briefing"
            }
            SummaryLength::Long => {
                "into a detailed summary with multiple paragraphs, covering all the main points and key takeaways"
            }
        }
    }

    /// Short label for menus and logs.
    pub fn label(&self) -> &'static str {
        match self {
            SummaryLength::Short => "Short",
            SummaryLength::Medium => "Medium",
            SummaryLength::Long => "Long",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SummaryLength {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => Err(BridgeError::OperationFailed(format!(
                "Unknown summary length: {}",
                other
            ))),
        }
    }
}

/// Article summarization service.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::generation::{SummaryProvider, SummaryLength};
///
/// async fn brief(provider: &dyn SummaryProvider, article: &str) -> Result<String> {
///     provider.summarize(article, SummaryLength::Short).await
/// }
/// ```
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Summarize `article` to the requested length. Returns plain text.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable, rejects the request, or
    /// responds without any text.
    async fn summarize(&self, article: &str, length: SummaryLength) -> Result<String>;
}

/// Text-to-speech service.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` and return the transport payload: base64 of raw
    /// 16-bit little-endian mono PCM at 24000 Hz.
    ///
    /// # Errors
    ///
    /// Returns error if the service fails or the response carries no audio.
    async fn synthesize(&self, text: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_length_is_medium() {
        assert_eq!(SummaryLength::default(), SummaryLength::Medium);
    }

    #[test]
    fn test_length_parsing() {
        assert_eq!("short".parse::<SummaryLength>().unwrap(), SummaryLength::Short);
        assert_eq!(" LONG ".parse::<SummaryLength>().unwrap(), SummaryLength::Long);
        assert!("tiny".parse::<SummaryLength>().is_err());
    }

    #[test]
    fn test_length_serde_is_lowercase() {
        let json = serde_json::to_string(&SummaryLength::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let parsed: SummaryLength = serde_json::from_str("\"short\"").unwrap();
        assert_eq!(parsed, SummaryLength::Short);
    }

    #[test]
    fn test_instructions_are_distinct() {
        let instructions: Vec<_> = SummaryLength::ALL.iter().map(|l| l.instruction()).collect();
        assert_eq!(instructions[0], "into a single, concise sentence");
        assert!(instructions[2].contains("multiple paragraphs"));
        assert_ne!(instructions[0], instructions[1]);
    }
}
