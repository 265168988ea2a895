//! RIFF/WAVE writer for 16-bit PCM.

use bytes::{BufMut, Bytes, BytesMut};
use core_runtime::config::WavQuantization;

use crate::buffer::AudioBuffer;
use crate::error::{PlaybackError, Result};

/// Size of the canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;
const FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;
/// The RIFF size field counts 36 header bytes plus the data chunk.
const MAX_DATA_LEN: u32 = u32::MAX - 36;

/// Header size fields of a 16-bit PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavLayout {
    pub channels: u16,
    pub block_align: u16,
    pub byte_rate: u32,
    pub data_len: u32,
}

impl WavLayout {
    /// Layout for `frames` frames of `channels` channels, or `None` if any
    /// header field would overflow its width.
    pub fn new(sample_rate: u32, channels: usize, frames: usize) -> Option<Self> {
        let channels = u16::try_from(channels).ok()?;
        let block_align = channels.checked_mul(BYTES_PER_SAMPLE)?;
        let byte_rate = sample_rate.checked_mul(u32::from(block_align))?;
        let data_len = frames
            .checked_mul(usize::from(block_align))
            .and_then(|len| u32::try_from(len).ok())
            .filter(|&len| len <= MAX_DATA_LEN)?;

        Some(Self {
            channels,
            block_align,
            byte_rate,
            data_len,
        })
    }

    fn sample_count(&self) -> usize {
        self.data_len as usize / usize::from(BYTES_PER_SAMPLE)
    }
}

/// Map one f32 sample to a 16-bit integer.
///
/// The input is clamped to `[-1.0, 1.0]` first; NaN becomes silence.
pub fn quantize(sample: f32, mode: WavQuantization) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    match mode {
        WavQuantization::Asymmetric => {
            if s < 0.0 {
                (s * 32768.0).round() as i16
            } else {
                (s * 32767.0).round() as i16
            }
        }
        // `as` saturates, so +1.0 lands on i16::MAX
        WavQuantization::Mirror => (s * 32768.0).round() as i16,
    }
}

/// Encodes audio buffers as 16-bit PCM WAV files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavEncoder {
    quantization: WavQuantization,
}

impl WavEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantization(quantization: WavQuantization) -> Self {
        Self { quantization }
    }

    pub fn quantization(&self) -> WavQuantization {
        self.quantization
    }

    /// Encode a buffer. Output length is `44 + frames * channels * 2`.
    pub fn encode(&self, buffer: &AudioBuffer) -> Bytes {
        self.write(&buffer.to_interleaved(), buffer.sample_rate(), buffer.wav_layout())
    }

    /// Encode already interleaved samples.
    ///
    /// Zero channels produce a valid header with an empty data chunk; a
    /// trailing partial frame is not written.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::InvalidFormat`] if the channel count or data size
    /// does not fit the WAV header.
    pub fn encode_interleaved(
        &self,
        samples: &[f32],
        sample_rate: u32,
        channels: u16,
    ) -> Result<Bytes> {
        let frame_count = if channels == 0 {
            0
        } else {
            samples.len() / usize::from(channels)
        };
        let layout = WavLayout::new(sample_rate, usize::from(channels), frame_count)
            .ok_or_else(|| {
                PlaybackError::InvalidFormat(format!(
                    "{} frames of {} channels at {} Hz exceed the WAV header limits",
                    frame_count, channels, sample_rate
                ))
            })?;
        Ok(self.write(samples, sample_rate, layout))
    }

    fn write(&self, samples: &[f32], sample_rate: u32, layout: WavLayout) -> Bytes {
        let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + layout.data_len as usize);

        // RIFF header
        out.put_slice(b"RIFF");
        out.put_u32_le(36 + layout.data_len);
        out.put_slice(b"WAVE");

        // fmt chunk
        out.put_slice(b"fmt ");
        out.put_u32_le(FMT_CHUNK_LEN);
        out.put_u16_le(FORMAT_PCM);
        out.put_u16_le(layout.channels);
        out.put_u32_le(sample_rate);
        out.put_u32_le(layout.byte_rate);
        out.put_u16_le(layout.block_align);
        out.put_u16_le(BITS_PER_SAMPLE);

        // data chunk
        out.put_slice(b"data");
        out.put_u32_le(layout.data_len);
        for &sample in &samples[..layout.sample_count()] {
            out.put_i16_le(quantize(sample, self.quantization));
        }

        out.freeze()
    }
}
