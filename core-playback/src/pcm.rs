//! 16-bit little-endian PCM interpretation.

use tracing::{trace, warn};

use crate::buffer::AudioBuffer;
use crate::error::{PlaybackError, Result};

/// Bytes per 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Divisor mapping `i16` onto `[-1.0, 1.0)`.
pub const PCM_SCALE: f32 = 32768.0;

/// Interpret interleaved signed 16-bit little-endian PCM.
///
/// A trailing partial frame is dropped without error, so any byte length is
/// accepted. Each sample is divided by 32768, which maps `i16::MAX` slightly
/// below `1.0`.
///
/// # Errors
///
/// [`PlaybackError::InvalidFormat`] when `sample_rate` or `channel_count` is
/// zero.
pub fn interpret(bytes: &[u8], sample_rate: u32, channel_count: u16) -> Result<AudioBuffer> {
    if channel_count == 0 {
        return Err(PlaybackError::InvalidFormat(
            "channel count must be positive".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(PlaybackError::InvalidFormat(
            "sample rate must be positive".to_string(),
        ));
    }

    let channels = channel_count as usize;
    let frame_bytes = BYTES_PER_SAMPLE * channels;
    let frame_count = bytes.len() / frame_bytes;
    let dropped = bytes.len() % frame_bytes;
    if dropped > 0 {
        warn!(
            dropped_bytes = dropped,
            total_bytes = bytes.len(),
            channels,
            "PCM payload ends with a partial frame; truncating"
        );
    }

    let mut planar: Vec<Vec<f32>> = (0..channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();
    for frame in bytes[..frame_count * frame_bytes].chunks_exact(frame_bytes) {
        for (channel, sample) in planar.iter_mut().zip(frame.chunks_exact(BYTES_PER_SAMPLE)) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            channel.push(value as f32 / PCM_SCALE);
        }
    }

    trace!(frame_count, channels, sample_rate, "Interpreted PCM payload");
    AudioBuffer::from_planar(sample_rate, planar)
}
