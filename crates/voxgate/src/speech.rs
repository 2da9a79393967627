//! Speech-to-text seam for binary audio messages.

pub mod engine;
pub mod unavailable;
#[cfg(feature = "vosk")]
pub mod vosk_engine;

use std::sync::Arc;

pub use engine::{
    decode_pcm16le, listening_status, transcription_failure, Recognizer, SharedSpeechEngine,
    SpeechEngine, Transcript,
};
pub use unavailable::UnavailableSpeech;

use crate::config::SpeechConfig;

/// The configured engine, or [`UnavailableSpeech`] when no model can be loaded.
pub fn build_speech(config: &SpeechConfig) -> SharedSpeechEngine {
    let Some(model_path) = config.model_path.as_deref() else {
        tracing::info!("no speech model configured; audio messages will be rejected");
        return Arc::new(UnavailableSpeech);
    };

    #[cfg(feature = "vosk")]
    {
        match vosk_engine::VoskSpeech::load(model_path, config.sample_rate) {
            Ok(engine) => {
                tracing::info!("loaded speech model from {}", model_path.display());
                Arc::new(engine)
            }
            Err(error) => {
                tracing::error!("{error}");
                Arc::new(UnavailableSpeech)
            }
        }
    }

    #[cfg(not(feature = "vosk"))]
    {
        tracing::warn!(
            "speech model {} configured but this build has no speech engine",
            model_path.display()
        );
        Arc::new(UnavailableSpeech)
    }
}
