//! Payload → buffer → WAV pipeline tests.
//!
//! Covers:
//! - Decoding a known transport payload end to end
//! - Re-encoding fidelity for both quantization modes
//! - Truncation of malformed byte lengths
//! - WAV output readable by an independent decoder

use core_playback::{codec, pcm, AudioBuffer, PlaybackError, WavEncoder, WavQuantization};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const RATE: u32 = 24_000;
const ONE_STEP: f32 = 1.0 / 32768.0;

fn pcm_payload(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    codec::encode(&bytes)
}

fn data_chunk(wav: &[u8]) -> &[u8] {
    &wav[44..]
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_known_payload_end_to_end() {
    let payload = pcm_payload(&[0, 16384, -16384, 32767]);
    assert_eq!(payload, "AAAAQADA/38=");

    let bytes = codec::decode(&payload).unwrap();
    let buffer = pcm::interpret(&bytes, RATE, 1).unwrap();

    let samples = buffer.channel(0).unwrap();
    assert_eq!(samples[0], 0.0);
    assert_eq!(samples[1], 0.5);
    assert_eq!(samples[2], -0.5);
    assert!((samples[3] - 0.999969).abs() < 1e-6);

    let wav = WavEncoder::with_quantization(WavQuantization::Mirror).encode(&buffer);
    assert_eq!(wav.len(), 44 + 8);
    assert_eq!(data_chunk(&wav), &[0, 0, 0, 64, 0, 192, 255, 127]);
}

#[test]
fn test_default_quantization_differs_only_on_positive_side() {
    let payload = pcm_payload(&[0, 16384, -16384, 32767]);
    let buffer = pcm::interpret(&codec::decode(&payload).unwrap(), RATE, 1).unwrap();

    let wav = WavEncoder::new().encode(&buffer);
    let written: Vec<i16> = data_chunk(&wav)
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    // 0.5 * 32767 rounds half away from zero; 32767/32768 * 32767 rounds down.
    assert_eq!(written, vec![0, 16384, -16384, 32766]);
}

#[test]
fn test_invalid_payload_is_transport_error() {
    let err = codec::decode("not base64!").unwrap_err();
    assert!(matches!(err, PlaybackError::TransportDecode(_)));
    assert!(err.is_format_error());
}

// ============================================================================
// Round trip
// ============================================================================

fn reinterpret(wav: &[u8], channels: u16) -> AudioBuffer {
    pcm::interpret(data_chunk(wav), RATE, channels).unwrap()
}

#[test]
fn test_round_trip_mirror_within_one_step() {
    let original: Vec<f32> = (0..480)
        .map(|i| (i as f32 * 0.05).sin() * 0.999)
        .chain([1.0, -1.0, 0.0, 0.75, -0.25])
        .collect();
    let buffer = AudioBuffer::mono(RATE, original.clone()).unwrap();

    let wav = WavEncoder::with_quantization(WavQuantization::Mirror).encode(&buffer);
    let decoded = reinterpret(&wav, 1);

    assert_eq!(decoded.frame_count(), original.len());
    for (a, b) in original.iter().zip(decoded.channel(0).unwrap()) {
        assert!((a - b).abs() <= ONE_STEP, "{} vs {}", a, b);
    }
}

#[test]
fn test_round_trip_decoded_audio_within_one_step() {
    // Audio that came from 16-bit PCM re-encodes within one step in the
    // default mode and exactly in mirror mode.
    let ints: Vec<i16> = (i16::MIN..=i16::MAX).step_by(97).chain([i16::MAX]).collect();
    let bytes: Vec<u8> = ints.iter().flat_map(|s| s.to_le_bytes()).collect();
    let buffer = pcm::interpret(&bytes, RATE, 1).unwrap();

    let asymmetric = reinterpret(&WavEncoder::new().encode(&buffer), 1);
    for (a, b) in buffer
        .channel(0)
        .unwrap()
        .iter()
        .zip(asymmetric.channel(0).unwrap())
    {
        assert!((a - b).abs() <= ONE_STEP + f32::EPSILON, "{} vs {}", a, b);
    }

    let mirror = WavEncoder::with_quantization(WavQuantization::Mirror).encode(&buffer);
    assert_eq!(data_chunk(&mirror), bytes.as_slice());
}

#[test]
fn test_stereo_round_trip_keeps_channel_order() {
    let left = vec![0.25, -0.25, 0.5];
    let right = vec![-0.5, 0.125, 0.0];
    let buffer = AudioBuffer::from_planar(RATE, vec![left.clone(), right.clone()]).unwrap();

    let decoded = reinterpret(&WavEncoder::new().encode(&buffer), 2);

    assert_eq!(decoded.channel_count(), 2);
    for (a, b) in left.iter().zip(decoded.channel(0).unwrap()) {
        assert!((a - b).abs() <= ONE_STEP);
    }
    for (a, b) in right.iter().zip(decoded.channel(1).unwrap()) {
        assert!((a - b).abs() <= ONE_STEP);
    }
}

// ============================================================================
// Malformed lengths
// ============================================================================

#[test]
fn test_odd_length_payload_truncates() {
    let bytes = codec::decode("AAAAQAA=").unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 64, 0]);

    let buffer = pcm::interpret(&bytes, RATE, 1).unwrap();
    assert_eq!(buffer.frame_count(), (bytes.len() - 1) / 2);
}

#[test]
fn test_partial_stereo_frame_dropped() {
    // Two full stereo frames plus one dangling sample.
    let bytes = [0u8, 64, 0, 192, 0, 32, 0, 224, 1, 0];
    let buffer = pcm::interpret(&bytes, RATE, 2).unwrap();

    assert_eq!(buffer.frame_count(), 2);
    assert_eq!(buffer.channel(0).unwrap(), &[0.5, 0.25]);
    assert_eq!(buffer.channel(1).unwrap(), &[-0.5, -0.25]);
}

// ============================================================================
// Independent readback
// ============================================================================

#[test]
fn test_wav_readable_by_symphonia() {
    let buffer = AudioBuffer::mono(RATE, vec![0.0, 0.5, -0.5, -1.0, 1.0]).unwrap();
    let wav = WavEncoder::new().encode(&buffer);

    let source = MediaSourceStream::new(
        Box::new(std::io::Cursor::new(wav.to_vec())),
        Default::default(),
    );
    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .expect("probe wav");
    let mut format = probed.format;

    let params = format.default_track().expect("track").codec_params.clone();
    assert_eq!(params.sample_rate, Some(RATE));
    assert_eq!(params.channels.map(|c| c.count()), Some(1));

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .expect("pcm decoder");

    let mut samples = Vec::new();
    while let Ok(packet) = format.next_packet() {
        let decoded = decoder.decode(&packet).expect("decode packet");
        let mut block = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
        block.copy_interleaved_ref(decoded);
        samples.extend_from_slice(block.samples());
    }

    assert_eq!(samples, vec![0, 16384, -16384, -32768, 32767]);
}
