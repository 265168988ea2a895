//! Decoded audio buffer.

use bridge_traits::playback::PcmFrames;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PlaybackError, Result};
use crate::wav::WavLayout;

/// Planar f32 audio at a fixed sample rate.
///
/// Every channel holds the same number of frames and the whole buffer fits
/// a 16-bit PCM WAV file. Samples decoded from 16-bit PCM lie in
/// `[-1.0, 1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
    layout: WavLayout,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample vectors.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::InvalidFormat`] if there are no channels, the sample
    /// rate is zero, the channels differ in length, or the audio would not
    /// fit a WAV header.
    pub fn from_planar(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(PlaybackError::InvalidFormat(
                "sample rate must be positive".to_string(),
            ));
        }
        let Some(first) = channels.first() else {
            return Err(PlaybackError::InvalidFormat(
                "buffer needs at least one channel".to_string(),
            ));
        };
        let frames = first.len();
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(PlaybackError::InvalidFormat(
                "channels differ in length".to_string(),
            ));
        }

        let layout = WavLayout::new(sample_rate, channels.len(), frames).ok_or_else(|| {
            PlaybackError::InvalidFormat(format!(
                "{} frames of {} channels at {} Hz exceed the WAV header limits",
                frames,
                channels.len(),
                sample_rate
            ))
        })?;

        Ok(Self {
            sample_rate,
            channels,
            layout,
        })
    }

    /// Mono buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::from_planar(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn wav_layout(&self) -> WavLayout {
        self.layout
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples of one channel, or `None` if out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Frame-major interleaving: frame 0 of every channel, then frame 1, ...
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for frame in 0..self.frame_count() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// Hand the buffer to an audio engine.
    pub fn to_pcm_frames(&self) -> PcmFrames {
        PcmFrames::new(
            self.sample_rate,
            self.layout.channels,
            Arc::from(self.to_interleaved().into_boxed_slice()),
        )
    }
}
