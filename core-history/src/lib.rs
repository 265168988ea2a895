//! # Briefing History
//!
//! Persists generated briefings (summary text plus speech payload) and
//! exchanges them through share links.
//!
//! ## Overview
//!
//! - [`HistoryStore`]: newest-first list stored as one JSON blob in a
//!   `SettingsStore`; write failures are logged and never surface
//! - [`share`]: `#share=<token>` URL fragments carrying one briefing
//! - [`HistoryCursor`]: wrap-around keyboard focus over the list

pub mod cursor;
pub mod error;
pub mod models;
pub mod share;
pub mod store;

pub use cursor::HistoryCursor;
pub use error::{HistoryError, Result};
pub use models::HistoryEntry;
pub use share::SharePayload;
pub use store::HistoryStore;
