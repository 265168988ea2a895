//! # Desktop Bridge
//!
//! Host capabilities for running the briefing core outside a browser:
//!
//! | Trait | Implementation | Backed by |
//! |-------|----------------|-----------|
//! | `HttpClient` | [`ReqwestHttpClient`] | `reqwest` with rustls |
//! | `SettingsStore` | [`SqliteSettingsStore`] | one SQLite `kv_store` table |
//! | `FileSystemAccess` | [`TokioFileSystem`] | the user's download folder |
//! | `AudioEngine` | [`ClockedAudioEngine`] | a tokio timer, no output device |
//!
//! ```ignore
//! let settings = SqliteSettingsStore::new(data_dir.join("briefing.db")).await?;
//! let engine = ClockedAudioEngine::new();
//! ```

mod audio;
mod filesystem;
mod http;
mod settings;

pub use audio::ClockedAudioEngine;
pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
