use serde::{Deserialize, Serialize};

use super::take::VoiceStack;

/// Work left over when a background batch stops early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPlan {
    pub total_stacks_planned: usize,
    pub remaining_stacks: usize,
    pub takes_per_stack: usize,
}

/// Snapshot of a studio session, as exported to `MANIFEST.JSON`.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceStackManifest {
    #[serde(rename = "sessionStarted")]
    pub session_started: u64,
    #[serde(rename = "totalStacks")]
    pub total_stacks: usize,
    /// Newest stack first.
    pub stacks: Vec<VoiceStack>,
    pub resume_token: Option<String>,
    pub next_plan: Option<BackgroundPlan>,
    pub background_sim_active: bool,
}

impl VoiceStackManifest {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
