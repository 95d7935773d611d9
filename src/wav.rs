//! 16-bit PCM WAV encoding and decoding.
//!
//! The encoder writes a fixed 44-byte header (`RIFF`, `WAVE`, a 16-byte
//! `fmt ` chunk and a `data` chunk) followed by one little-endian `i16` per
//! sample. It is mono only: callers holding multi-channel audio pass the
//! first channel, see [`AudioBuffer::to_wav_bytes`].
//!
//! # Quantization
//!
//! Each sample is clamped to `[-1.0, 1.0]`, then scaled asymmetrically:
//! negative values by 32768, non-negative values by 32767, and rounded to
//! the nearest integer (ties away from zero). `-1.0` maps to `-32768` and
//! `1.0` to `32767`. `NaN` maps to `0`.
//!
//! ```rust
//! let bytes = vocalis::wav::encode_wav(&[0.5, -0.5], 16000)?;
//! assert_eq!(bytes.len(), 48);
//! assert_eq!(&bytes[0..4], b"RIFF");
//! # Ok::<(), vocalis::wav::WavError>(())
//! ```

use std::io::Read;
use std::path::Path;

use crate::AudioBuffer;

/// Media type for the byte streams produced by [`encode_wav`].
pub const WAV_MEDIA_TYPE: &str = "audio/wav";

/// Size of the canonical header written by [`encode_wav`].
pub const HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

#[derive(thiserror::Error, Debug)]
pub enum WavError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read WAV data: {0}")]
    Read(#[from] hound::Error),
}

/// Encode mono f32 samples as a 16-bit PCM WAV byte stream.
///
/// The result is exactly `44 + 2 * samples.len()` bytes long. Fails only
/// when `sample_rate` is zero or a header field would overflow.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    if sample_rate == 0 {
        return Err(WavError::InvalidArgument(
            "sample rate must be positive".to_string(),
        ));
    }
    let byte_rate = sample_rate
        .checked_mul(u32::from(BLOCK_ALIGN))
        .ok_or_else(|| {
            WavError::InvalidArgument(format!("sample rate {sample_rate} Hz is too large"))
        })?;
    let data_len = samples
        .len()
        .checked_mul(usize::from(BLOCK_ALIGN))
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            WavError::InvalidArgument(format!(
                "{} samples do not fit in a WAV container",
                samples.len()
            ))
        })?;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_len as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(32 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    buf.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());

    let mut non_finite = 0usize;
    for &sample in samples {
        if !sample.is_finite() {
            non_finite += 1;
        }
        buf.extend_from_slice(&quantize(sample).to_le_bytes());
    }
    if non_finite > 0 {
        log::warn!("Clamped {non_finite} non-finite sample(s) while encoding WAV");
    }

    Ok(buf)
}

/// Convert one float sample to a signed 16-bit value.
pub fn quantize(sample: f32) -> i16 {
    let s = f64::from(sample).clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    // `as` saturates and maps NaN to 0
    scaled.round() as i16
}

/// Decode interleaved little-endian 16-bit PCM into an [`AudioBuffer`].
///
/// Each sample becomes `value / 32768.0`, for both signs. The encoder scales
/// non-negative samples by 32767, so decoding and re-encoding is exact for
/// negative values but can lose up to one step on positive ones (`32767`
/// comes back as `32766`).
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: usize) -> Result<AudioBuffer, WavError> {
    if channels == 0 {
        return Err(WavError::InvalidArgument(
            "channel count must be positive".to_string(),
        ));
    }
    if bytes.len() % 2 != 0 {
        return Err(WavError::InvalidArgument(format!(
            "PCM payload length {} is not a multiple of 2",
            bytes.len()
        )));
    }
    let total = bytes.len() / 2;
    if total % channels != 0 {
        return Err(WavError::InvalidArgument(format!(
            "{total} samples cannot be split into {channels} channels"
        )));
    }

    let frames = total / channels;
    let mut out = vec![Vec::with_capacity(frames); channels];
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        out[i % channels].push(f32::from(value) / 32768.0);
    }

    AudioBuffer::new(sample_rate, out)
}

/// Read a WAV stream into an [`AudioBuffer`].
///
/// Integer formats up to 16 bits and 32-bit float are supported. Integer
/// samples are divided by `2^(bits - 1)` regardless of sign, with the same
/// re-encoding caveat as [`decode_pcm16`].
pub fn read_wav_from<R: Read>(reader: R) -> Result<AudioBuffer, WavError> {
    let reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        return Err(WavError::InvalidArgument(
            "WAV file declares zero channels".to_string(),
        ));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, bits @ 1..=16) => {
            let scale = f32::from(1u16 << (bits - 1));
            reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| f32::from(v) / scale))
                .collect::<Result<_, _>>()?
        }
        (format, bits) => {
            return Err(WavError::InvalidArgument(format!(
                "unsupported WAV sample format {format:?} at {bits} bits"
            )))
        }
    };

    let frames = interleaved.len() / channels;
    let mut out = vec![Vec::with_capacity(frames); channels];
    for (i, sample) in interleaved.into_iter().enumerate() {
        out[i % channels].push(sample);
    }

    log::debug!(
        "Read WAV: {} channel(s), {} frames at {} Hz",
        channels,
        frames,
        spec.sample_rate
    );
    AudioBuffer::new(spec.sample_rate, out)
}

/// Read a WAV file into an [`AudioBuffer`].
pub fn read_wav(path: &Path) -> Result<AudioBuffer, WavError> {
    let file = std::fs::File::open(path)?;
    read_wav_from(std::io::BufReader::new(file))
}

/// Encode `buffer` and write it to `path`.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<(), WavError> {
    let bytes = buffer.to_wav_bytes()?;
    std::fs::write(path, &bytes)?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
