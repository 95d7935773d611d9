//! Voice-take studio sessions.
//!
//! A [`StudioSession`] turns a script plus voice, emotion and expression
//! selections into *stacks* of *takes*. Audio and metadata come from a
//! [`SpeechProvider`](crate::SpeechProvider); the session only tracks what was
//! rendered and exports takes as WAV.
//!
//! # Batches
//!
//! | Mode | Stacks | Takes per stack |
//! |---|---|---|
//! | standard | 1 | 2 |
//! | background | `batch_count` (1–10) | `takes_per_batch` (1–4) |
//! | resumed | `remaining_stacks` of the plan | `takes_per_stack` of the plan |
//!
//! Background batches of more than two stacks simulate an output limit: they
//! stop after the second stack, issue a `RESUME_XXXXXX` token and record a
//! [`BackgroundPlan`] for [`StudioSession::resume`].
//!
//! # Naming
//!
//! Stacks are numbered `V01`, `V02`, ... across the whole session. Takes are
//! `V01-T01`, `V01-T02`, ... and export as `vocalis_V01_T01.wav`.
//!
//! # Example
//!
//! ```rust,no_run
//! use vocalis::studio::{Emotion, StudioConfigBuilder, StudioSession, VoiceName};
//! use vocalis::SpeechProvider;
//!
//! fn run_batch<P: SpeechProvider>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfigBuilder::default()
//!         .script("Suara kami terdengar natural dan jernih.")
//!         .voice(VoiceName::Aoede)
//!         .emotion(Emotion::Cheerful)
//!         .background_sim(true)
//!         .batch_count(4usize)
//!         .build()?;
//!
//!     let mut session = StudioSession::new(provider, config);
//!     session.generate()?;
//!     while session.resume_token().is_some() {
//!         session.resume()?;
//!     }
//!     println!("{}", session.manifest().to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod manifest;
pub mod playback;
pub mod session;
pub mod take;
pub mod voices;

pub use config::{StudioConfig, StudioConfigBuilder};
pub use manifest::{BackgroundPlan, VoiceStackManifest};
pub use playback::{PlaybackHandle, PlaybackSlot};
pub use session::{GenerationOutcome, StudioError, StudioSession};
pub use take::{VoiceMetadata, VoiceStack, VoiceTake};
pub use voices::{Emotion, VoiceName};
