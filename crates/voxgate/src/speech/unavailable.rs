use super::engine::{Recognizer, SpeechEngine, Transcript};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSpeech;

impl SpeechEngine for UnavailableSpeech {
    fn id(&self) -> &str {
        "unavailable"
    }

    fn sample_rate(&self) -> u32 {
        16_000
    }

    fn recognizer(&self) -> GatewayResult<Box<dyn Recognizer>> {
        Ok(Box::new(UnavailableRecognizer))
    }
}

struct UnavailableRecognizer;

impl Recognizer for UnavailableRecognizer {
    fn accept(&mut self, _samples: &[i16]) -> GatewayResult<Transcript> {
        Err(GatewayError::Transcription(
            "no speech engine is configured".to_string(),
        ))
    }
}
