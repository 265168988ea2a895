//! Share links
//!
//! A briefing travels in the URL fragment as `#share=<token>`, where the
//! token is URL-safe unpadded base64 of `{"summary": .., "audio": ..}`.
//! Nothing is uploaded; the link itself carries the audio.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};
use crate::models::HistoryEntry;

/// Fragment key preceding the token.
pub const SHARE_PREFIX: &str = "share=";

/// Contents of a share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub summary: String,
    /// Transport payload (base64 PCM)
    pub audio: String,
}

impl SharePayload {
    pub fn new(summary: impl Into<String>, audio: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            audio: audio.into(),
        }
    }

    /// Token placed after `#share=`.
    pub fn to_token(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Inverse of [`to_token`](Self::to_token).
    pub fn from_token(token: &str) -> Result<Self> {
        let json = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| HistoryError::InvalidShareLink(format!("bad encoding: {}", e)))?;
        let payload: SharePayload = serde_json::from_slice(&json)
            .map_err(|e| HistoryError::InvalidShareLink(format!("bad payload: {}", e)))?;

        if payload.summary.trim().is_empty() || payload.audio.trim().is_empty() {
            return Err(HistoryError::InvalidShareLink(
                "summary or audio is empty".to_string(),
            ));
        }
        Ok(payload)
    }
}

impl From<&HistoryEntry> for SharePayload {
    fn from(entry: &HistoryEntry) -> Self {
        Self::new(entry.summary_text.clone(), entry.audio_data.clone())
    }
}

/// `base_url` with its fragment replaced by `#share=<token>`.
pub fn share_url(base_url: &str, payload: &SharePayload) -> Result<String> {
    let base = base_url.split('#').next().unwrap_or(base_url);
    Ok(format!("{}#{}{}", base, SHARE_PREFIX, payload.to_token()?))
}

/// Parse a URL fragment, with or without the leading `#`, or a full URL.
pub fn parse_fragment(fragment: &str) -> Result<SharePayload> {
    let fragment = fragment
        .rsplit_once('#')
        .map_or(fragment, |(_, after)| after);

    let token = fragment
        .strip_prefix(SHARE_PREFIX)
        .ok_or_else(|| HistoryError::InvalidShareLink("missing share= prefix".to_string()))?;

    SharePayload::from_token(token)
}
