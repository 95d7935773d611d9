use std::ops::RangeInclusive;
use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::session::StudioError;
use super::voices::{Emotion, VoiceName};

/// Allowed number of stacks in one background batch.
pub const BATCH_COUNT_RANGE: RangeInclusive<usize> = 1..=10;
/// Allowed number of takes per stack in a background batch.
pub const TAKES_PER_BATCH_RANGE: RangeInclusive<usize> = 1..=4;
/// Takes rendered per stack outside background mode.
pub const STANDARD_TAKES_PER_STACK: usize = 2;

/// Parameters for a studio session.
///
/// Build with [`StudioConfigBuilder`] or load from JSON with
/// [`StudioConfig::from_json_file`]; both paths validate the batch sizes.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct StudioConfig {
    /// Script to perform.
    pub script: String,
    pub voice: VoiceName,
    pub emotion: Emotion,
    /// Free-form nuance passed to the provider alongside the emotion.
    pub expression: String,
    /// Run the simulated background batch instead of a single stack.
    pub background_sim: bool,
    /// Stacks per background batch.
    pub batch_count: usize,
    /// Takes per stack in a background batch.
    pub takes_per_batch: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            script: String::new(),
            voice: VoiceName::Kore,
            emotion: Emotion::Professional,
            expression: String::new(),
            background_sim: false,
            batch_count: 2,
            takes_per_batch: 2,
        }
    }
}

impl StudioConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, StudioError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded studio config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StudioError> {
        check_batch(self.batch_count, self.takes_per_batch).map_err(StudioError::Config)
    }
}

impl StudioConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = StudioConfig::default();
        check_batch(
            self.batch_count.unwrap_or(defaults.batch_count),
            self.takes_per_batch.unwrap_or(defaults.takes_per_batch),
        )
    }
}

impl From<StudioConfigBuilderError> for StudioError {
    fn from(e: StudioConfigBuilderError) -> Self {
        StudioError::Config(e.to_string())
    }
}

fn check_batch(batch_count: usize, takes_per_batch: usize) -> Result<(), String> {
    if !BATCH_COUNT_RANGE.contains(&batch_count) {
        return Err(format!(
            "batch_count {batch_count} outside {}..={}",
            BATCH_COUNT_RANGE.start(),
            BATCH_COUNT_RANGE.end()
        ));
    }
    if !TAKES_PER_BATCH_RANGE.contains(&takes_per_batch) {
        return Err(format!(
            "takes_per_batch {takes_per_batch} outside {}..={}",
            TAKES_PER_BATCH_RANGE.start(),
            TAKES_PER_BATCH_RANGE.end()
        ));
    }
    Ok(())
}
