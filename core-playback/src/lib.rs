//! # Audio Codec Bridge
//!
//! Turns the transport payload returned by a speech service (base64 of raw
//! 16-bit little-endian PCM) into something playable and downloadable.
//!
//! ## Overview
//!
//! ```text
//! payload ──codec::decode──▶ bytes ──pcm::interpret──▶ AudioBuffer
//!                                                        │      │
//!                                    PlaybackController ◀┘      └▶ WavEncoder ──▶ AudioExport
//! ```
//!
//! - [`codec`]: strict standard-alphabet base64
//! - [`pcm`]: interleaved `i16` LE to planar `f32`
//! - [`wav`]: canonical 44-byte-header PCM WAV writer
//! - [`controller`]: single-session playback state machine
//! - [`commands`]: message interface used by input handling
//!
//! ## Example
//!
//! ```ignore
//! use core_playback::{AudioSettings, PlaybackController};
//!
//! let controller = Arc::new(PlaybackController::new(engine, AudioSettings::default()));
//! controller.load(payload).await?;
//! controller.toggle().await?;
//! let export = controller.export().await?;
//! ```

pub mod buffer;
pub mod codec;
pub mod commands;
pub mod controller;
pub mod error;
pub mod export;
pub mod pcm;
pub mod wav;

pub use buffer::AudioBuffer;
pub use commands::{
    command_channel, PlaybackCommand, PlaybackCommandSender, DEFAULT_COMMAND_CAPACITY,
};
pub use controller::{
    DecodedLoad, LoadOutcome, PendingLoad, PlaybackController, PlayerState, PlayerStatus,
};
pub use core_runtime::config::{AudioSettings, WavQuantization};
pub use error::{PlaybackError, Result};
pub use export::{AudioExport, WAV_CONTENT_TYPE};
pub use wav::{WavEncoder, WavLayout};
