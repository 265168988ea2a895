//! Audio output capability.
//!
//! The host owns exactly one engine and injects it; the playback controller
//! closes it on shutdown. Each `start` call is an independent one-shot
//! session, the same shape as a Web Audio buffer source node.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;

/// Handle for one started session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of an audio engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created but not yet started, or suspended by the platform.
    Suspended,
    /// Ready to produce sound.
    Running,
    /// Released; no further sessions can be started.
    Closed,
}

/// Interleaved PCM frames handed to the engine for one session.
///
/// Samples are `f32` in `[-1.0, 1.0]`, ordered frame-major
/// (`[L0, R0, L1, R1, ...]` for stereo).
#[derive(Debug, Clone)]
pub struct PcmFrames {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Interleaved sample data, shared without copying.
    pub samples: Arc<[f32]>,
}

impl PcmFrames {
    /// Create a new frame set.
    pub fn new(sample_rate: u32, channels: u16, samples: Arc<[f32]>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Number of frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Playback duration at the nominal sample rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Notification sent by an engine when a session reaches its natural end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnded {
    /// The session that finished.
    pub session: PlaybackSessionId,
}

/// Channel on which engines report [`SessionEnded`].
pub type SessionEndedSender = mpsc::UnboundedSender<SessionEnded>;

/// Request describing one playback session.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    /// Audio to play from the start.
    pub frames: PcmFrames,
    /// Output gain, `0.0..=1.0`.
    pub volume: f32,
    /// Where to report natural end-of-stream.
    pub on_ended: SessionEndedSender,
}

impl PlaybackRequest {
    /// Construct a request at unity gain.
    pub fn new(frames: PcmFrames, on_ended: SessionEndedSender) -> Self {
        Self {
            frames,
            volume: 1.0,
            on_ended,
        }
    }

    /// Override the output gain.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }
}

/// Platform audio output.
///
/// Contract:
/// - [`resume`](AudioEngine::resume) initializes the engine on first use and
///   resumes it after platform suspension (autoplay policies).
/// - [`start`](AudioEngine::start) begins one session from the first frame and
///   returns its identifier. When the session plays to the end, the engine
///   sends [`SessionEnded`] on the request's channel.
/// - [`stop`](AudioEngine::stop) is idempotent: stopping an unknown, finished
///   or already-stopped session succeeds. A stopped session never reports
///   `SessionEnded`.
/// - [`close`](AudioEngine::close) stops everything and releases the
///   underlying device handles.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Initialize or resume the engine.
    async fn resume(&self) -> Result<()>;

    /// Start a playback session.
    async fn start(&self, request: PlaybackRequest) -> Result<PlaybackSessionId>;

    /// Stop a playback session and release its resources.
    async fn stop(&self, session: PlaybackSessionId) -> Result<()>;

    /// Release the engine.
    async fn close(&self) -> Result<()>;

    /// Current lifecycle state.
    fn state(&self) -> EngineState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_distinct() {
        let a = PlaybackSessionId::new();
        assert_ne!(a, PlaybackSessionId::new());
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn pcm_frames_duration() {
        let samples: Arc<[f32]> = Arc::from(vec![0.0f32; 48_000].into_boxed_slice());
        let stereo = PcmFrames::new(24_000, 2, samples);

        assert_eq!(stereo.frame_count(), 24_000);
        assert_eq!(stereo.duration(), Duration::from_secs(1));
    }

    #[test]
    fn pcm_frames_degenerate_format() {
        let samples: Arc<[f32]> = Arc::from(vec![0.5f32; 4].into_boxed_slice());

        assert_eq!(PcmFrames::new(24_000, 0, samples.clone()).frame_count(), 0);
        assert_eq!(
            PcmFrames::new(0, 1, samples).duration(),
            Duration::ZERO
        );
    }

    #[test]
    fn request_defaults_to_unity_gain() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let frames = PcmFrames::new(24_000, 1, Arc::from(Vec::new().into_boxed_slice()));
        let request = PlaybackRequest::new(frames, tx);
        assert_eq!(request.volume, 1.0);
        assert_eq!(request.with_volume(0.25).volume, 0.25);
    }
}
