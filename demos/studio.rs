use std::path::PathBuf;
use std::time::Instant;

use vocalis::{
    studio::{Emotion, GenerationOutcome, StudioConfigBuilder, StudioSession, VoiceMetadata, VoiceName},
    AudioBuffer, ProviderError, SpeechProvider, TakeRequest,
};

const SAMPLE_RATE: u32 = 24000;
const WORDS_PER_MINUTE: f64 = 150.0;

/// Stand-in provider: a short tone per take, pitched by voice.
struct ToneProvider;

impl ToneProvider {
    fn estimate_secs(script: &str) -> f64 {
        let words = script.split_whitespace().count().max(1);
        words as f64 * 60.0 / WORDS_PER_MINUTE
    }
}

impl SpeechProvider for ToneProvider {
    fn generate_metadata(&mut self, request: &TakeRequest<'_>) -> Result<VoiceMetadata, ProviderError> {
        Ok(VoiceMetadata {
            language: "id-ID".to_string(),
            accent: "neutral".to_string(),
            gender_style: request.voice.description().unwrap_or("unspecified").to_string(),
            pace_wpm: WORDS_PER_MINUTE,
            pitch: "mid".to_string(),
            energy: request.emotion.to_string(),
            room_tone: "dry booth".to_string(),
            noise_floor: "-60 dBFS".to_string(),
            de_esser: "light".to_string(),
            limiter: "-1 dBTP".to_string(),
            loudness_target_lufs: -16.0,
            file_format: "wav".to_string(),
            duration_estimate_sec: Self::estimate_secs(request.script),
        })
    }

    fn synthesize(
        &mut self,
        request: &TakeRequest<'_>,
        style_note: &str,
    ) -> Result<AudioBuffer, ProviderError> {
        let freq = match request.voice {
            VoiceName::Puck | VoiceName::Aoede => 220.0,
            _ => 110.0,
        } * if style_note.starts_with("standard") { 1.0 } else { 1.5 };
        let len = (Self::estimate_secs(request.script) * f64::from(SAMPLE_RATE)) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / f64::from(SAMPLE_RATE);
                (0.4 * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
            })
            .collect();
        Ok(AudioBuffer::mono(SAMPLE_RATE, samples)?)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let out_dir = PathBuf::from("studio-output");
    std::fs::create_dir_all(&out_dir)?;

    let config = StudioConfigBuilder::default()
        .script(
            "Selamat datang di Vocalis Pro. Mesin suara profesional untuk kebutuhan \
             iklan dan edukasi Anda.",
        )
        .voice(VoiceName::Kore)
        .emotion(Emotion::Professional)
        .background_sim(true)
        .batch_count(3usize)
        .takes_per_batch(2usize)
        .build()?;

    let mut session = StudioSession::new(ToneProvider, config);

    let start = Instant::now();
    let mut outcome = session.generate()?;
    while let GenerationOutcome::Interrupted { resume_token, plan } = &outcome {
        println!(
            "Batch interrupted ({resume_token}), {} of {} stacks remaining",
            plan.remaining_stacks, plan.total_stacks_planned
        );
        outcome = session.resume()?;
    }
    println!(
        "Rendered {} stacks in {:.2?}",
        session.stacks().len(),
        start.elapsed()
    );

    let take_ids: Vec<String> = session
        .stacks()
        .iter()
        .flat_map(|s| s.takes.iter().map(|t| t.id.clone()))
        .collect();
    for id in &take_ids {
        let path = session.export_take_to_dir(id, &out_dir)?;
        println!("Saved {id} to {}", path.display());
    }

    std::fs::write(out_dir.join("manifest.json"), session.manifest().to_json_pretty()?)?;
    println!("Saved manifest to {}", out_dir.join("manifest.json").display());
    Ok(())
}
