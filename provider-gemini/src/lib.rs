//! # Gemini Provider
//!
//! Implements `SummaryProvider` and `SpeechProvider` on top of the Gemini
//! `generateContent` REST endpoint.
//!
//! ## Overview
//!
//! This module provides:
//! - Length-controlled article summarization (`gemini-2.5-flash`)
//! - Text-to-speech returning base64 PCM (`gemini-2.5-flash-preview-tts`)
//! - API-key authentication through the `HttpClient` bridge
//! - Single-attempt requests; failures are reported, never replayed

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GeminiConnector;
pub use error::{GeminiError, Result};
