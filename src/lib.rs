//! # vocalis
//!
//! A Rust library for running voice-take studio sessions and exporting the
//! resulting audio as 16-bit PCM WAV files.
//!
//! ## Features
//!
//! - **WAV export**: Byte-exact RIFF/WAVE encoding of decoded float audio
//! - **Take stacks**: Scripted batches of takes grouped into named stacks
//! - **Background batches**: Interrupted batches issue a resume token and a plan
//! - **Pluggable providers**: Speech and metadata come from any [`SpeechProvider`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! vocalis = "2026.2"
//! ```
//!
//! ```ignore
//! use vocalis::studio::{StudioConfigBuilder, StudioSession};
//!
//! let config = StudioConfigBuilder::default()
//!     .script("Selamat datang di Vocalis Pro.")
//!     .build()?;
//! let mut session = StudioSession::new(my_provider, config);
//!
//! session.generate()?;
//! let (bytes, file_name) = session.export_take("V01-T01")?;
//! std::fs::write(file_name, bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod studio;
pub mod wav;

use std::error::Error;
use std::path::Path;

use studio::{Emotion, VoiceMetadata, VoiceName};
use wav::WavError;

/// A decoded, in-memory audio buffer.
///
/// Holds one or more channels of f32 samples of equal length. Samples are
/// nominally in `[-1.0, 1.0]` but may exceed it; the encoder clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample arrays.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, WavError> {
        if sample_rate == 0 {
            return Err(WavError::InvalidArgument(
                "sample rate must be positive".to_string(),
            ));
        }
        let Some(first) = channels.first() else {
            return Err(WavError::InvalidArgument(
                "audio buffer needs at least one channel".to_string(),
            ));
        };
        let frames = first.len();
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(WavError::InvalidArgument(format!(
                "channel {idx} has {} samples, expected {frames}",
                ch.len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a single-channel buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self, WavError> {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of channel `idx`, or `None` if out of range.
    pub fn channel(&self, idx: usize) -> Option<&[f32]> {
        self.channels.get(idx).map(Vec::as_slice)
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Encode the buffer as a mono 16-bit PCM WAV byte stream.
    ///
    /// Only channel 0 is encoded; any further channels are dropped.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, WavError> {
        if self.channels.len() > 1 {
            log::debug!(
                "Encoding channel 0 only, dropping {} extra channel(s)",
                self.channels.len() - 1
            );
        }
        wav::encode_wav(&self.channels[0], self.sample_rate)
    }

    /// Write the buffer to a mono 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), WavError> {
        wav::write_wav(path, self)
    }
}

/// Everything a provider needs to render or describe one take.
#[derive(Debug, Clone, Copy)]
pub struct TakeRequest<'a> {
    pub script: &'a str,
    pub voice: VoiceName,
    pub emotion: Emotion,
    pub expression: &'a str,
}

/// Boxed error returned by providers.
pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Common interface for speech and metadata providers.
///
/// Implementations wrap whatever service actually renders audio. The studio
/// only relies on this trait, so a provider can be a remote API client, a
/// local engine, or a scripted stand-in for tests.
pub trait SpeechProvider {
    /// Describe the technical audio properties expected for a take.
    fn generate_metadata(&mut self, request: &TakeRequest<'_>) -> Result<VoiceMetadata, ProviderError>;

    /// Render one take of the script with an additional style note.
    fn synthesize(
        &mut self,
        request: &TakeRequest<'_>,
        style_note: &str,
    ) -> Result<AudioBuffer, ProviderError>;
}

impl<P: SpeechProvider + ?Sized> SpeechProvider for &mut P {
    fn generate_metadata(&mut self, request: &TakeRequest<'_>) -> Result<VoiceMetadata, ProviderError> {
        (**self).generate_metadata(request)
    }

    fn synthesize(
        &mut self,
        request: &TakeRequest<'_>,
        style_note: &str,
    ) -> Result<AudioBuffer, ProviderError> {
        (**self).synthesize(request, style_note)
    }
}

#[cfg(test)]
mod tests {
    use super::AudioBuffer;
    use crate::wav::WavError;

    #[test]
    fn rejects_zero_sample_rate() {
        let err = AudioBuffer::mono(0, vec![0.0]).unwrap_err();
        assert!(matches!(err, WavError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_missing_or_ragged_channels() {
        assert!(AudioBuffer::new(24000, vec![]).is_err());
        assert!(AudioBuffer::new(24000, vec![vec![0.0; 3], vec![0.0; 2]]).is_err());
    }

    #[test]
    fn reports_frames_and_duration() {
        let buf = AudioBuffer::new(8000, vec![vec![0.0; 4000], vec![0.0; 4000]]).unwrap();
        assert_eq!(buf.len(), 4000);
        assert_eq!(buf.channel_count(), 2);
        assert!((buf.duration_secs() - 0.5).abs() < f64::EPSILON);
        assert!(buf.channel(2).is_none());
    }

    #[test]
    fn encodes_only_the_first_channel() {
        let buf = AudioBuffer::new(16000, vec![vec![0.5, -0.5], vec![1.0, 1.0]]).unwrap();
        let bytes = buf.to_wav_bytes().unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[44..48], &[0x00, 0x40, 0x00, 0xC0]);
    }
}
