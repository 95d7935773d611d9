use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::wav::WavError;
use crate::{ProviderError, SpeechProvider, TakeRequest};

use super::config::{StudioConfig, STANDARD_TAKES_PER_STACK};
use super::manifest::{BackgroundPlan, VoiceStackManifest};
use super::take::{
    stack_id, style_description, take_file_name, take_id, take_style, VoiceStack, VoiceTake,
};

/// Prefix of every issued resume token.
pub const RESUME_TOKEN_PREFIX: &str = "RESUME_";

const RESUME_TOKEN_LEN: usize = 6;
const RESUME_TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    #[error("Script is empty. Enter some text before generating.")]
    EmptyScript,
    #[error("Speech provider failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("Audio error: {0}")]
    Audio(#[from] WavError),
    #[error("Take '{0}' not found in this session")]
    TakeNotFound(String),
    #[error("Take '{0}' has no audio to export")]
    NoAudio(String),
    #[error("Invalid studio config: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a call to [`StudioSession::generate`] or [`StudioSession::resume`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Every planned stack was rendered.
    Completed { stacks: usize },
    /// A background batch stopped early; call [`StudioSession::resume`] to
    /// render the rest of `plan`.
    Interrupted {
        resume_token: String,
        plan: BackgroundPlan,
    },
}

/// A studio session: the stack history plus background batch state.
///
/// Stacks are kept newest first. Takes are rendered one at a time through
/// the session's [`SpeechProvider`].
pub struct StudioSession<P: SpeechProvider> {
    provider: P,
    config: StudioConfig,
    stacks: Vec<VoiceStack>,
    resume_token: Option<String>,
    next_plan: Option<BackgroundPlan>,
    session_started: u64,
}

impl<P: SpeechProvider> StudioSession<P> {
    pub fn new(provider: P, config: StudioConfig) -> Self {
        Self {
            provider,
            config,
            stacks: Vec::new(),
            resume_token: None,
            next_plan: None,
            session_started: now_millis(),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Replace the configuration used by the next batch.
    pub fn set_config(&mut self, config: StudioConfig) -> Result<(), StudioError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Stack history, newest first.
    pub fn stacks(&self) -> &[VoiceStack] {
        &self.stacks
    }

    pub fn resume_token(&self) -> Option<&str> {
        self.resume_token.as_deref()
    }

    pub fn next_plan(&self) -> Option<&BackgroundPlan> {
        self.next_plan.as_ref()
    }

    /// Render a new batch from the current configuration.
    ///
    /// Outside background mode this is one stack of two takes. In background
    /// mode it is `batch_count` stacks of `takes_per_batch` takes, and batches
    /// of more than two stacks stop after the second one with a resume token.
    pub fn generate(&mut self) -> Result<GenerationOutcome, StudioError> {
        self.run_batch(false)
    }

    /// Continue the plan left by an interrupted background batch.
    ///
    /// Without a pending plan this behaves like [`StudioSession::generate`].
    pub fn resume(&mut self) -> Result<GenerationOutcome, StudioError> {
        self.run_batch(true)
    }

    /// Drop all stacks together with any pending resume token and plan.
    pub fn clear_history(&mut self) {
        log::info!("Clearing {} stack(s)", self.stacks.len());
        self.stacks.clear();
        self.resume_token = None;
        self.next_plan = None;
    }

    pub fn find_take(&self, take_id: &str) -> Option<&VoiceTake> {
        self.stacks.iter().find_map(|s| s.take(take_id))
    }

    /// Encode a take as WAV, returning the bytes and the take's file name.
    pub fn export_take(&self, take_id: &str) -> Result<(Vec<u8>, String), StudioError> {
        let take = self
            .find_take(take_id)
            .ok_or_else(|| StudioError::TakeNotFound(take_id.to_string()))?;
        let audio = take
            .audio_buffer
            .as_ref()
            .ok_or_else(|| StudioError::NoAudio(take_id.to_string()))?;
        Ok((audio.to_wav_bytes()?, take.file_name.clone()))
    }

    /// Export a take into `dir` under its own file name.
    pub fn export_take_to_dir(&self, take_id: &str, dir: &Path) -> Result<PathBuf, StudioError> {
        let (bytes, file_name) = self.export_take(take_id)?;
        let path = dir.join(file_name);
        std::fs::write(&path, bytes)?;
        log::info!("Exported {take_id} to {}", path.display());
        Ok(path)
    }

    pub fn manifest(&self) -> VoiceStackManifest {
        VoiceStackManifest {
            session_started: self.session_started,
            total_stacks: self.stacks.len(),
            stacks: self.stacks.clone(),
            resume_token: self.resume_token.clone(),
            next_plan: self.next_plan,
            background_sim_active: self.config.background_sim,
        }
    }

    fn run_batch(&mut self, resuming: bool) -> Result<GenerationOutcome, StudioError> {
        if self.config.script.trim().is_empty() {
            return Err(StudioError::EmptyScript);
        }

        let background = self.config.background_sim;
        let start = self.stacks.len() + 1;
        let (total, takes) = match (resuming, self.next_plan) {
            (true, Some(plan)) => (plan.remaining_stacks, plan.takes_per_stack),
            _ if background => (self.config.batch_count, self.config.takes_per_batch),
            _ => (1, STANDARD_TAKES_PER_STACK),
        };

        log::info!(
            "Starting {} batch: {total} stack(s) x {takes} take(s) from V{start:02}",
            if resuming { "resumed" } else if background { "background" } else { "standard" }
        );

        let mut new_stacks = Vec::with_capacity(total);
        for s in 0..total {
            let id = stack_id(start + s);
            let mut stack_takes = Vec::with_capacity(takes);
            for t in 1..=takes {
                stack_takes.push(self.render_take(&id, t)?);
            }
            new_stacks.push(self.make_stack(id, stack_takes));

            // Simulated output limit: long background batches stop after the second stack.
            if background && s == 1 && total > 2 {
                let token = generate_resume_token(&mut rand::thread_rng());
                let plan = BackgroundPlan {
                    total_stacks_planned: total,
                    remaining_stacks: total - (s + 1),
                    takes_per_stack: takes,
                };
                self.commit(new_stacks);
                self.resume_token = Some(token.clone());
                self.next_plan = Some(plan);
                log::info!(
                    "Output limit reached, issued {token}; {} stack(s) remaining",
                    plan.remaining_stacks
                );
                return Ok(GenerationOutcome::Interrupted {
                    resume_token: token,
                    plan,
                });
            }
        }

        let rendered = new_stacks.len();
        self.commit(new_stacks);
        self.resume_token = None;
        self.next_plan = None;
        log::info!("Batch finished with {rendered} stack(s)");
        Ok(GenerationOutcome::Completed { stacks: rendered })
    }

    fn render_take(&mut self, stack_id: &str, take: usize) -> Result<VoiceTake, StudioError> {
        let id = take_id(stack_id, take);
        let style = take_style(take);
        let request = TakeRequest {
            script: &self.config.script,
            voice: self.config.voice,
            emotion: self.config.emotion,
            expression: &self.config.expression,
        };

        log::debug!("[{id}] Analyzing metadata...");
        let metadata = self.provider.generate_metadata(&request)?;

        log::debug!("[{id}] Synthesizing audio ({style})...");
        let audio = self.provider.synthesize(&request, &style)?;

        Ok(VoiceTake {
            id,
            file_name: take_file_name(stack_id, take),
            audio_buffer: Some(audio),
            metadata: Some(metadata),
            style_description: style_description(take, &style),
            timestamp: now_millis(),
        })
    }

    fn make_stack(&self, stack_id: String, takes: Vec<VoiceTake>) -> VoiceStack {
        VoiceStack {
            stack_id,
            takes,
            prompt: self.config.script.clone(),
            voice: self.config.voice,
            emotion: self.config.emotion,
            expression: self.config.expression.clone(),
            timestamp: now_millis(),
        }
    }

    /// Prepend a batch to the history, newest stack first.
    fn commit(&mut self, new_stacks: Vec<VoiceStack>) {
        self.stacks.splice(0..0, new_stacks.into_iter().rev());
    }
}

/// Build a `RESUME_XXXXXX` token from uppercase letters and digits.
pub fn generate_resume_token<R: Rng>(rng: &mut R) -> String {
    let mut token = String::with_capacity(RESUME_TOKEN_PREFIX.len() + RESUME_TOKEN_LEN);
    token.push_str(RESUME_TOKEN_PREFIX);
    for _ in 0..RESUME_TOKEN_LEN {
        let idx = rng.gen_range(0..RESUME_TOKEN_CHARSET.len());
        token.push(char::from(RESUME_TOKEN_CHARSET[idx]));
    }
    token
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::{Emotion, StudioConfigBuilder, VoiceMetadata, VoiceName};
    use crate::AudioBuffer;

    /// Provider that renders a fixed ramp and can be told to fail.
    #[derive(Default)]
    struct ScriptedProvider {
        metadata_calls: usize,
        synth_calls: usize,
        styles: Vec<String>,
        fail_on_synth: Option<usize>,
    }

    impl SpeechProvider for ScriptedProvider {
        fn generate_metadata(&mut self, request: &TakeRequest<'_>) -> Result<VoiceMetadata, ProviderError> {
            self.metadata_calls += 1;
            Ok(VoiceMetadata {
                language: "id-ID".to_string(),
                accent: "neutral".to_string(),
                gender_style: request.voice.to_string(),
                pace_wpm: 150.0,
                pitch: "mid".to_string(),
                energy: request.emotion.to_string(),
                room_tone: "dry".to_string(),
                noise_floor: "-60 dBFS".to_string(),
                de_esser: "light".to_string(),
                limiter: "-1 dBTP".to_string(),
                loudness_target_lufs: -16.0,
                file_format: "wav".to_string(),
                duration_estimate_sec: 0.5,
            })
        }

        fn synthesize(
            &mut self,
            _request: &TakeRequest<'_>,
            style_note: &str,
        ) -> Result<AudioBuffer, ProviderError> {
            self.synth_calls += 1;
            if self.fail_on_synth == Some(self.synth_calls) {
                return Err("quota exceeded".into());
            }
            self.styles.push(style_note.to_string());
            Ok(AudioBuffer::mono(24000, vec![0.0, 0.25, -0.25, 0.5])?)
        }
    }

    fn config(background_sim: bool, batch_count: usize, takes_per_batch: usize) -> StudioConfig {
        StudioConfigBuilder::default()
            .script("Selamat datang di Vocalis Pro.")
            .voice(VoiceName::Charon)
            .emotion(Emotion::Serious)
            .background_sim(background_sim)
            .batch_count(batch_count)
            .takes_per_batch(takes_per_batch)
            .build()
            .unwrap()
    }

    fn stack_ids<P: SpeechProvider>(session: &StudioSession<P>) -> Vec<&str> {
        session.stacks().iter().map(|s| s.stack_id.as_str()).collect()
    }

    #[test]
    fn standard_mode_renders_one_stack_of_two_takes() {
        let mut provider = ScriptedProvider::default();
        let mut session = StudioSession::new(&mut provider, config(false, 5, 4));

        let outcome = session.generate().unwrap();
        assert_eq!(outcome, GenerationOutcome::Completed { stacks: 1 });

        let stack = &session.stacks()[0];
        assert_eq!(stack.stack_id, "V01");
        assert_eq!(stack.voice, VoiceName::Charon);
        assert_eq!(stack.emotion, Emotion::Serious);
        assert_eq!(stack.prompt, "Selamat datang di Vocalis Pro.");
        let ids: Vec<&str> = stack.takes.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["V01-T01", "V01-T02"]);
        assert_eq!(stack.takes[0].file_name, "vocalis_V01_T01.wav");
        assert_eq!(
            stack.takes[1].style_description,
            "Alternative: conversational variation 1"
        );
        assert!(session.resume_token().is_none());

        drop(session);
        assert_eq!(provider.metadata_calls, 2);
        assert_eq!(provider.synth_calls, 2);
        assert_eq!(
            provider.styles,
            vec!["standard high-quality studio", "conversational variation 1"]
        );
    }

    #[test]
    fn new_stacks_go_to_the_front() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(false, 2, 2));
        session.generate().unwrap();
        session.generate().unwrap();
        assert_eq!(stack_ids(&session), vec!["V02", "V01"]);
    }

    #[test]
    fn short_background_batches_are_not_interrupted() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 2, 3));
        let outcome = session.generate().unwrap();
        assert_eq!(outcome, GenerationOutcome::Completed { stacks: 2 });
        assert_eq!(stack_ids(&session), vec!["V02", "V01"]);
        assert_eq!(session.stacks()[0].takes.len(), 3);
        assert_eq!(session.provider().synth_calls, 6);
    }

    #[test]
    fn long_background_batch_stops_after_second_stack() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 3, 2));

        let outcome = session.generate().unwrap();
        let GenerationOutcome::Interrupted { resume_token, plan } = outcome else {
            panic!("expected an interrupted batch");
        };
        assert!(resume_token.starts_with(RESUME_TOKEN_PREFIX));
        assert_eq!(
            plan,
            BackgroundPlan {
                total_stacks_planned: 3,
                remaining_stacks: 1,
                takes_per_stack: 2,
            }
        );
        assert_eq!(session.resume_token(), Some(resume_token.as_str()));
        assert_eq!(session.next_plan(), Some(&plan));
        assert_eq!(stack_ids(&session), vec!["V02", "V01"]);
        assert_eq!(session.stacks()[0].takes.len(), 2);

        let outcome = session.resume().unwrap();
        assert_eq!(outcome, GenerationOutcome::Completed { stacks: 1 });
        assert_eq!(stack_ids(&session), vec!["V03", "V02", "V01"]);
        assert!(session.resume_token().is_none());
        assert!(session.next_plan().is_none());
    }

    #[test]
    fn resumed_plans_can_be_interrupted_again() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 5, 1));

        assert!(matches!(
            session.generate().unwrap(),
            GenerationOutcome::Interrupted { plan, .. } if plan.remaining_stacks == 3
        ));
        assert!(matches!(
            session.resume().unwrap(),
            GenerationOutcome::Interrupted { plan, .. } if plan.remaining_stacks == 1
                && plan.total_stacks_planned == 3
        ));
        assert_eq!(session.resume().unwrap(), GenerationOutcome::Completed { stacks: 1 });
        assert_eq!(stack_ids(&session), vec!["V05", "V04", "V03", "V02", "V01"]);
    }

    #[test]
    fn resume_uses_the_planned_take_count() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 3, 3));
        session.generate().unwrap();
        session.set_config(config(false, 2, 1)).unwrap();
        session.resume().unwrap();
        assert_eq!(session.stacks()[0].stack_id, "V03");
        assert_eq!(session.stacks()[0].takes.len(), 3);
    }

    #[test]
    fn resume_without_plan_acts_like_generate() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(false, 2, 2));
        assert_eq!(session.resume().unwrap(), GenerationOutcome::Completed { stacks: 1 });
        assert_eq!(session.stacks()[0].takes.len(), 2);
    }

    #[test]
    fn provider_failure_leaves_history_untouched() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 3, 2));
        session.generate().unwrap();
        let token = session.resume_token().map(str::to_string);

        session.provider.fail_on_synth = Some(session.provider.synth_calls + 2);
        let err = session.resume().unwrap_err();
        assert!(matches!(err, StudioError::Provider(_)));
        assert_eq!(stack_ids(&session), vec!["V02", "V01"]);
        assert_eq!(session.resume_token().map(str::to_string), token);
        assert_eq!(session.next_plan().map(|p| p.remaining_stacks), Some(1));
    }

    #[test]
    fn empty_script_is_rejected_before_calling_the_provider() {
        let mut cfg = config(false, 2, 2);
        cfg.script = "   \n".to_string();
        let mut session = StudioSession::new(ScriptedProvider::default(), cfg);
        assert!(matches!(session.generate(), Err(StudioError::EmptyScript)));
        assert_eq!(session.provider().metadata_calls, 0);
        assert!(session.stacks().is_empty());
    }

    #[test]
    fn clear_history_drops_pending_plan() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 4, 1));
        session.generate().unwrap();
        session.clear_history();
        assert!(session.stacks().is_empty());
        assert!(session.resume_token().is_none());
        assert!(session.next_plan().is_none());

        session.set_config(config(false, 2, 2)).unwrap();
        session.generate().unwrap();
        assert_eq!(stack_ids(&session), vec!["V01"]);
    }

    #[test]
    fn exports_takes_as_wav() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(false, 2, 2));
        session.generate().unwrap();

        let (bytes, name) = session.export_take("V01-T02").unwrap();
        assert_eq!(name, "vocalis_V01_T02.wav");
        assert_eq!(bytes.len(), 44 + 2 * 4);
        assert_eq!(&bytes[0..4], b"RIFF");

        assert!(matches!(
            session.export_take("V09-T01"),
            Err(StudioError::TakeNotFound(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = session.export_take_to_dir("V01-T01", dir.path()).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.file_name().unwrap(), "vocalis_V01_T01.wav");
        assert_eq!(std::fs::read(&path).unwrap().len(), 52);
    }

    #[test]
    fn exporting_a_take_without_audio_fails() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(false, 2, 2));
        let take = VoiceTake {
            id: "V01-T01".to_string(),
            file_name: take_file_name("V01", 1),
            audio_buffer: None,
            metadata: None,
            style_description: style_description(1, &take_style(1)),
            timestamp: 0,
        };
        let stack = session.make_stack(stack_id(1), vec![take]);
        session.commit(vec![stack]);

        let err = session.export_take("V01-T01").unwrap_err();
        assert!(matches!(err, StudioError::NoAudio(ref id) if id == "V01-T01"));

        let dir = tempfile::tempdir().unwrap();
        assert!(session.export_take_to_dir("V01-T01", dir.path()).is_err());
        assert!(!dir.path().join("vocalis_V01_T01.wav").exists());
    }

    #[test]
    fn manifest_reflects_session_state() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(true, 3, 1));
        session.generate().unwrap();

        let manifest = session.manifest();
        assert_eq!(manifest.total_stacks, 2);
        assert!(manifest.background_sim_active);

        let json: serde_json::Value =
            serde_json::from_str(&manifest.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["totalStacks"], 2);
        assert_eq!(json["stacks"][0]["stackId"], "V02");
        assert_eq!(json["stacks"][0]["takes"][0]["audioBuffer"], "[AudioData]");
        assert_eq!(json["stacks"][0]["voice"], "Charon");
        assert_eq!(json["next_plan"]["remainingStacks"], 1);
        assert!(json["resume_token"].as_str().unwrap().starts_with("RESUME_"));
    }

    #[test]
    fn set_config_validates() {
        let mut session = StudioSession::new(ScriptedProvider::default(), config(false, 2, 2));
        let mut bad = config(true, 2, 2);
        bad.batch_count = 0;
        assert!(matches!(session.set_config(bad), Err(StudioError::Config(_))));
        assert!(!session.config().background_sim);
    }

    #[test]
    fn resume_tokens_use_uppercase_alphanumerics() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let token = generate_resume_token(&mut rng);
            assert_eq!(token.len(), RESUME_TOKEN_PREFIX.len() + RESUME_TOKEN_LEN);
            let suffix = &token[RESUME_TOKEN_PREFIX.len()..];
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
