use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::session::StudioError;

/// Prebuilt voice actor profiles understood by speech providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VoiceName {
    #[default]
    Kore,
    Puck,
    Charon,
    Fenrir,
    Aoede,
    Zephyr,
}

impl VoiceName {
    pub const ALL: [VoiceName; 6] = [
        VoiceName::Kore,
        VoiceName::Puck,
        VoiceName::Charon,
        VoiceName::Fenrir,
        VoiceName::Aoede,
        VoiceName::Zephyr,
    ];

    /// Voice profiles offered for selection, in display order.
    pub fn catalog() -> &'static [VoiceName] {
        &[
            VoiceName::Kore,
            VoiceName::Puck,
            VoiceName::Charon,
            VoiceName::Fenrir,
            VoiceName::Aoede,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoiceName::Kore => "Kore",
            VoiceName::Puck => "Puck",
            VoiceName::Charon => "Charon",
            VoiceName::Fenrir => "Fenrir",
            VoiceName::Aoede => "Aoede",
            VoiceName::Zephyr => "Zephyr",
        }
    }

    /// Short casting note for voices listed in [`VoiceName::catalog`].
    pub fn description(self) -> Option<&'static str> {
        match self {
            VoiceName::Kore => Some("Male, deep, professional"),
            VoiceName::Puck => Some("Female, energetic, bright"),
            VoiceName::Charon => Some("Male, warm, narrative"),
            VoiceName::Fenrir => Some("Male, authoritative, clear"),
            VoiceName::Aoede => Some("Female, soft, instructional"),
            VoiceName::Zephyr => None,
        }
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceName {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceName::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudioError::Config(format!("unknown voice '{s}'")))
    }
}

/// Base emotion requested for a performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Emotion {
    Neutral,
    Cheerful,
    #[default]
    Professional,
    Serious,
    Dramatic,
    Conversational,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Neutral,
        Emotion::Cheerful,
        Emotion::Professional,
        Emotion::Serious,
        Emotion::Dramatic,
        Emotion::Conversational,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Cheerful => "Cheerful",
            Emotion::Professional => "Professional",
            Emotion::Serious => "Serious",
            Emotion::Dramatic => "Dramatic",
            Emotion::Conversational => "Conversational",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudioError::Config(format!("unknown emotion '{s}'")))
    }
}
