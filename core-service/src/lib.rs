//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (audio output,
//! settings storage, filesystem, generation providers) into the briefing
//! core and exposes [`BriefingService`] to hosts. Desktop apps typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`)
//! and call [`bootstrap_desktop`].

pub mod error;
pub mod input;
pub mod service;

pub use error::{CoreError, Result, Stage};
pub use input::{FocusTarget, KeyCode, KeyEvent, Shortcut, ShortcutMapper};
pub use service::{Briefing, BriefingService};

use std::sync::Arc;

use bridge_traits::{
    generation::{SpeechProvider, SummaryProvider},
    playback::AudioEngine,
    storage::{FileSystemAccess, SettingsStore},
};
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use provider_gemini::GeminiConnector;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub summary: Arc<dyn SummaryProvider>,
    pub speech: Arc<dyn SpeechProvider>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub audio_engine: Arc<dyn AudioEngine>,
    pub file_system: Arc<dyn FileSystemAccess>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        summary: Arc<dyn SummaryProvider>,
        speech: Arc<dyn SpeechProvider>,
        settings_store: Arc<dyn SettingsStore>,
        audio_engine: Arc<dyn AudioEngine>,
        file_system: Arc<dyn FileSystemAccess>,
    ) -> Self {
        Self {
            summary,
            speech,
            settings_store,
            audio_engine,
            file_system,
        }
    }

    /// Bridges from `config`, with one Gemini connector serving both
    /// summary and speech.
    pub fn from_config(config: &AppConfig) -> Self {
        let connector = Arc::new(GeminiConnector::new(
            Arc::clone(&config.http_client),
            config.gemini.clone(),
        ));

        Self {
            summary: connector.clone(),
            speech: connector,
            settings_store: Arc::clone(&config.settings_store),
            audio_engine: Arc::clone(&config.audio_engine),
            file_system: Arc::clone(&config.file_system),
        }
    }
}

impl BriefingService {
    /// Start a service from a validated [`AppConfig`].
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let deps = CoreDependencies::from_config(&config);
        let events = EventBus::new(config.event_buffer_size);
        Self::start(deps, config.audio, config.history, events).await
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// History is stored in the SQLite database at `db_path` and audio goes to
/// the headless [`ClockedAudioEngine`](bridge_desktop::ClockedAudioEngine);
/// hosts with a sound device build their own [`AppConfig`] instead.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::GeminiConfig;
/// use core_service::bootstrap_desktop;
///
/// let service = bootstrap_desktop(GeminiConfig::from_env()?, "briefings.db".into()).await?;
/// let entries = service.history().list().await;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    gemini: core_runtime::config::GeminiConfig,
    db_path: std::path::PathBuf,
) -> Result<BriefingService> {
    use bridge_desktop::{ClockedAudioEngine, SqliteSettingsStore};

    let settings = SqliteSettingsStore::new(db_path)
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let config = AppConfig::builder()
        .settings_store(Arc::new(settings))
        .audio_engine(Arc::new(ClockedAudioEngine::new()))
        .gemini(gemini)
        .build()?;

    BriefingService::from_config(config).await
}
