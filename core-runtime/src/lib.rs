//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the briefing core:
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast capability checks
//! - Event bus system
//!
//! Every other core crate depends on this one for its configuration types
//! and for the event and logging conventions used across the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
