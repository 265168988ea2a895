//! # Core Configuration Module
//!
//! Configuration for the briefing core.
//!
//! ## Overview
//!
//! [`AppConfig`] is built with [`AppConfigBuilder`] and holds every bridge
//! and setting the core needs. The builder fails fast: a missing capability
//! is reported with an actionable message before any service starts.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - persists the summary history
//! - `AudioEngine` - plays decoded briefings
//! - [`GeminiConfig`] - credentials for summary and speech generation
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `FileSystemAccess` - saving exported audio (desktop default: tokio fs)
//!
//! Without the `desktop-shims` feature the optional bridges must be injected
//! too; otherwise `build()` returns [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AppConfig, GeminiConfig};
//! use std::sync::Arc;
//!
//! let config = AppConfig::builder()
//!     .settings_store(Arc::new(settings))
//!     .audio_engine(Arc::new(ClockedAudioEngine::new()))
//!     .gemini(GeminiConfig::from_env()?)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::logging::redact_if_sensitive;
use bridge_traits::{AudioEngine, FileSystemAccess, HttpClient, SettingsStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Sample rate of the speech service's PCM output.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Storage key of the history blob, shared with the web client.
pub const DEFAULT_HISTORY_KEY: &str = "audioSummaryHistory";

/// File name offered for exported audio.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "summary.mp3";

// ============================================================================
// Gemini
// ============================================================================

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_summary_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice_name() -> String {
    "Kore".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Connection settings for the Gemini generation API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,

    /// Base URL up to and including the API version
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used for article summaries
    #[serde(default = "default_summary_model")]
    pub summary_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Prebuilt voice for speech synthesis
    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl GeminiConfig {
    /// Default settings with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: default_api_base(),
            summary_model: default_summary_model(),
            speech_model: default_speech_model(),
            voice_name: default_voice_name(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Read the API key from the `API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the API key through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::MissingEnv {
                name: API_KEY_ENV.to_string(),
            })?;

        Ok(Self::new(api_key.trim()))
    }

    /// Override the API base URL (used to point at a proxy or a test server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the speech voice.
    pub fn with_voice(mut self, voice_name: impl Into<String>) -> Self {
        self.voice_name = voice_name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "Gemini API key cannot be empty. Set the {} environment variable.",
                API_KEY_ENV
            )));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(Error::Config(format!(
                "Gemini API base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }

        if self.summary_model.is_empty() || self.speech_model.is_empty() {
            return Err(Error::Config("Gemini model names cannot be empty".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "Gemini request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("api_base", &self.api_base)
            .field("summary_model", &self.summary_model)
            .field("speech_model", &self.speech_model)
            .field("voice_name", &self.voice_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

// ============================================================================
// Audio
// ============================================================================

/// How f32 samples are mapped back to 16-bit integers when writing WAV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavQuantization {
    /// Negative samples scale by 32768, non-negative by 32767.
    /// Full scale `1.0` maps to `32767` exactly.
    #[default]
    Asymmetric,
    /// Both signs scale by 32768 and saturate at `i16::MAX`.
    /// Exact inverse of PCM decoding, so decoded transport audio is written
    /// back bit-for-bit.
    Mirror,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_channels() -> u16 {
    1
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

/// Format of the transport audio and of exported files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Sample rate of transport PCM in hertz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count of transport PCM
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Re-quantization used by the WAV encoder
    #[serde(default)]
    pub wav_quantization: WavQuantization,

    /// File name offered for exported audio
    ///
    /// Defaults to `summary.mp3` although the content is WAV; clients rely
    /// on that name.
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            wav_quantization: WavQuantization::default(),
            export_file_name: default_export_file_name(),
        }
    }
}

impl AudioSettings {
    pub fn with_quantization(mut self, quantization: WavQuantization) -> Self {
        self.wav_quantization = quantization;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config(
                "Audio sample rate must be greater than 0 Hz".to_string(),
            ));
        }

        if self.channels == 0 {
            return Err(Error::Config(
                "Audio channel count must be at least 1".to_string(),
            ));
        }

        if self.export_file_name.trim().is_empty() {
            return Err(Error::Config(
                "Export file name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// History
// ============================================================================

fn default_storage_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

/// Where the history blob lives in the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Settings key of the JSON array
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

impl HistorySettings {
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(Error::Config(
                "History storage key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Application configuration
// ============================================================================

/// Everything the briefing core needs to start.
#[derive(Clone)]
pub struct AppConfig {
    /// Key-value storage for the history blob (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Audio output (required)
    pub audio_engine: Arc<dyn AudioEngine>,

    /// HTTP client for the generation API
    pub http_client: Arc<dyn HttpClient>,

    /// File system access for exported audio
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Generation API settings
    pub gemini: GeminiConfig,

    /// Transport audio and export settings
    pub audio: AudioSettings,

    /// History storage settings
    pub history: HistorySettings,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field("audio_engine", &"AudioEngine { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("gemini", &self.gemini)
            .field("audio", &self.audio)
            .field("history", &self.history)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validates settings values.
    pub fn validate(&self) -> Result<()> {
        self.gemini.validate()?;
        self.audio.validate()?;
        self.history.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist the briefing history. \
                 Desktop: inject bridge_desktop::SqliteSettingsStore. \
                 Web: inject a localStorage-backed store."
            .to_string(),
    }
}

fn audio_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioEngine".to_string(),
        message: "AudioEngine implementation is required for playback. \
                 Desktop: inject bridge_desktop::ClockedAudioEngine or a device-backed engine. \
                 Web: inject a Web Audio adapter."
            .to_string(),
    }
}

fn gemini_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "GeminiConfig".to_string(),
        message: format!(
            "Gemini credentials are required for summary and speech generation. \
             Use GeminiConfig::from_env() with the {} variable set, or GeminiConfig::new(key).",
            API_KEY_ENV
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the generation API. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Web: inject a fetch-based client."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required to save exported audio. \
                 Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
                 Web: inject a download-anchor adapter."
            .to_string(),
    })
}

/// Builder for constructing [`AppConfig`] instances.
#[derive(Default)]
pub struct AppConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    audio_engine: Option<Arc<dyn AudioEngine>>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    gemini: Option<GeminiConfig>,
    audio: Option<AudioSettings>,
    history: Option<HistorySettings>,
    event_buffer_size: Option<usize>,
}

impl AppConfigBuilder {
    /// Sets the settings store implementation (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the audio engine (required).
    ///
    /// The engine is owned by the core from here on: it is resumed on first
    /// playback and closed when the service shuts down.
    pub fn audio_engine(mut self, engine: Arc<dyn AudioEngine>) -> Self {
        self.audio_engine = Some(engine);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the file system access implementation.
    ///
    /// If not provided, the desktop default (tokio fs-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the Gemini API settings (required).
    pub fn gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    /// Sets transport audio and export settings.
    ///
    /// Default: mono, 24000 Hz, asymmetric quantization, `summary.mp3`
    pub fn audio(mut self, settings: AudioSettings) -> Self {
        self.audio = Some(settings);
        self
    }

    /// Sets history storage settings.
    pub fn history(mut self, settings: HistorySettings) -> Self {
        self.history = Some(settings);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `AppConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when a required bridge is absent, or an
    ///   optional one is absent and no platform default is compiled in
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<AppConfig> {
        let settings_store = self.settings_store.ok_or_else(settings_store_missing_error)?;
        let audio_engine = self.audio_engine.ok_or_else(audio_engine_missing_error)?;
        let gemini = self.gemini.ok_or_else(gemini_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let config = AppConfig {
            settings_store,
            audio_engine,
            http_client,
            file_system,
            gemini,
            audio: self.audio.unwrap_or_default(),
            history: self.history.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
