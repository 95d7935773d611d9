use serde::{Deserialize, Serialize, Serializer};

use crate::AudioBuffer;

use super::session::StudioError;
use super::voices::{Emotion, VoiceName};

/// Technical audio properties a provider predicts for a take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMetadata {
    pub language: String,
    pub accent: String,
    pub gender_style: String,
    pub pace_wpm: f64,
    pub pitch: String,
    pub energy: String,
    pub room_tone: String,
    pub noise_floor: String,
    pub de_esser: String,
    pub limiter: String,
    pub loudness_target_lufs: f64,
    pub file_format: String,
    pub duration_estimate_sec: f64,
}

impl VoiceMetadata {
    /// Parse a provider's JSON response. Every field is required.
    pub fn from_json(json: &str) -> Result<Self, StudioError> {
        Ok(serde_json::from_str(json.trim())?)
    }
}

/// One rendered take inside a stack.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTake {
    /// `V{stack}-T{take}`, e.g. `V03-T02`.
    pub id: String,
    pub file_name: String,
    #[serde(serialize_with = "audio_placeholder")]
    pub audio_buffer: Option<AudioBuffer>,
    pub metadata: Option<VoiceMetadata>,
    pub style_description: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// A group of takes rendered from one script submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStack {
    /// `V{n}`, e.g. `V03`.
    pub stack_id: String,
    pub takes: Vec<VoiceTake>,
    pub prompt: String,
    pub voice: VoiceName,
    pub emotion: Emotion,
    pub expression: String,
    pub timestamp: u64,
}

impl VoiceStack {
    pub fn take(&self, take_id: &str) -> Option<&VoiceTake> {
        self.takes.iter().find(|t| t.id == take_id)
    }
}

/// Stack id for the 1-based stack index `n`.
pub fn stack_id(n: usize) -> String {
    format!("V{n:02}")
}

/// Take id for the 1-based take index within a stack.
pub fn take_id(stack_id: &str, take: usize) -> String {
    format!("{stack_id}-T{take:02}")
}

/// Export file name for a take.
pub fn take_file_name(stack_id: &str, take: usize) -> String {
    format!("vocalis_{stack_id}_T{take:02}.wav")
}

/// Style note sent to the provider for the 1-based take index.
pub fn take_style(take: usize) -> String {
    if take == 1 {
        "standard high-quality studio".to_string()
    } else {
        format!("conversational variation {}", take - 1)
    }
}

/// Human-readable label shown next to a take.
pub fn style_description(take: usize, style: &str) -> String {
    let role = if take == 1 { "Primary" } else { "Alternative" };
    format!("{role}: {style}")
}

fn audio_placeholder<S: Serializer>(audio: &Option<AudioBuffer>, s: S) -> Result<S::Ok, S::Error> {
    match audio {
        Some(_) => s.serialize_str("[AudioData]"),
        None => s.serialize_none(),
    }
}
