//! Gemini API connector implementation
//!
//! Implements `SummaryProvider` and `SpeechProvider` over the `HttpClient`
//! bridge.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::generation::{SpeechProvider, SummaryLength, SummaryProvider};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::GeminiConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GeminiError;
use crate::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini API connector
///
/// Both operations send exactly one request; the caller decides what to do
/// with a failure.
///
/// # Example
///
/// ```ignore
/// use provider_gemini::GeminiConnector;
/// use bridge_traits::generation::{SummaryProvider, SpeechProvider, SummaryLength};
///
/// let connector = GeminiConnector::new(http_client, GeminiConfig::from_env()?);
/// let summary = connector.summarize(&article, SummaryLength::Short).await?;
/// let payload = connector.synthesize(&summary).await?;
/// ```
pub struct GeminiConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Endpoint, models, voice and key
    config: GeminiConfig,
}

impl GeminiConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, config: GeminiConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Prompt asking for a summary of `article` at `length`.
    pub fn summary_prompt(article: &str, length: SummaryLength) -> String {
        format!(
            "Summarize the following news article {}. Focus on the key points and main takeaways:\n\n---\n\n{}",
            length.instruction(),
            article
        )
    }

    /// Prompt asking for `text` to be read aloud.
    pub fn speech_prompt(text: &str) -> String {
        format!("Say with a clear and engaging news-reader voice: {}", text)
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    /// POST one `generateContent` request and parse the reply.
    #[instrument(skip(self, body), fields(model = %model))]
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> crate::Result<GenerateContentResponse> {
        let request = HttpRequest::post(self.endpoint(model))
            .api_key(self.config.api_key.as_str())
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .json(body)?;

        let response = self
            .http_client
            .execute(request)
            .await?;

        if !response.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&response.body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| response.text_lossy());
            warn!(status = response.status, %message, "Gemini request failed");
            return Err(GeminiError::ApiError {
                status_code: response.status,
                message,
            });
        }

        debug!(status = response.status, size = response.body.len(), "Gemini request succeeded");

        serde_json::from_slice(&response.body).map_err(|e| {
            GeminiError::ParseError(format!("Failed to parse generateContent response: {}", e))
        })
    }
}

#[async_trait]
impl SummaryProvider for GeminiConnector {
    #[instrument(skip(self, article), fields(length = %length, article_chars = article.chars().count()))]
    async fn summarize(&self, article: &str, length: SummaryLength) -> Result<String> {
        info!("Requesting summary");

        let body = GenerateContentRequest::text(Self::summary_prompt(article, length));
        let response = self.generate(&self.config.summary_model, &body).await?;

        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()).into());
        }

        let text = response
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GeminiError::EmptySummary)?;

        info!(summary_chars = text.chars().count(), "Summary generated");
        Ok(text)
    }
}

#[async_trait]
impl SpeechProvider for GeminiConnector {
    #[instrument(skip(self, text), fields(text_chars = text.chars().count(), voice = %self.config.voice_name))]
    async fn synthesize(&self, text: &str) -> Result<String> {
        info!("Requesting speech");

        let body = GenerateContentRequest::text(Self::speech_prompt(text))
            .with_speech(self.config.voice_name.clone());
        let response = self.generate(&self.config.speech_model, &body).await?;

        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()).into());
        }

        let audio = response.inline_audio().ok_or(GeminiError::MissingAudio)?;

        info!(
            payload_len = audio.data.len(),
            mime_type = %audio.mime_type,
            "Speech generated"
        );
        Ok(audio.data.clone())
    }
}
