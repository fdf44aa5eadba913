//! WAV renderer: renders a Track to a WAV byte buffer.

use crate::composer::Track;
use crate::options::RenderOptions;

use super::engine::AudioEngine;

/// Size of the RIFF/WAVE header written by [`encode_wav`].
pub const WAV_HEADER_LEN: usize = 44;

/// Render a Track to a WAV file as bytes (16-bit mono PCM).
pub fn render_wav(track: &Track, options: &RenderOptions) -> Vec<u8> {
    let samples = render_samples(track, options);
    encode_wav(&samples, options.sample_rate)
}

/// Render a Track to normalized mono samples without encoding.
pub fn render_samples(track: &Track, options: &RenderOptions) -> Vec<f32> {
    AudioEngine::with_options(options).render(track)
}

/// Quantize a sample in [-1, 1] to signed 16-bit.
///
/// Negative values scale by 32768 and positive by 32767, so both -1.0 and
/// 1.0 map to the extremes. Out-of-range input is clamped first.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0) as f64;
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled as i16
}

/// RIFF and data chunk sizes for `num_samples` 16-bit mono samples.
///
/// Both saturate at `u32::MAX`, the largest size a RIFF header can state.
fn chunk_sizes(num_samples: usize) -> (u32, u32) {
    let data_size = u32::try_from(num_samples.saturating_mul(2)).unwrap_or(u32::MAX);
    (data_size.saturating_add(36), data_size)
}

/// Encode mono samples as a 16-bit PCM WAV byte buffer.
///
/// Inputs past 2^31 - 19 samples cannot be described by a RIFF header; the
/// size fields then saturate at `u32::MAX` while every sample is still written.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate.wrapping_mul(block_align as u32);
    let (file_size, data_size) = chunk_sizes(samples.len());

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * block_align as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }

    buf
}
