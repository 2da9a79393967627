use std::path::Path;
use std::sync::Arc;

use vosk::{DecodingState, Model};

use super::engine::{Recognizer, SpeechEngine, Transcript};
use crate::error::{GatewayError, GatewayResult};

pub struct VoskSpeech {
    model: Arc<Model>,
    sample_rate: u32,
}

impl VoskSpeech {
    pub fn load(model_path: &Path, sample_rate: u32) -> GatewayResult<Self> {
        if !model_path.exists() {
            return Err(GatewayError::Transcription(format!(
                "speech model not found at {}",
                model_path.display()
            )));
        }
        let model = Model::new(model_path.to_string_lossy()).ok_or_else(|| {
            GatewayError::Transcription(format!(
                "failed to load speech model from {}",
                model_path.display()
            ))
        })?;
        Ok(Self {
            model: Arc::new(model),
            sample_rate,
        })
    }
}

impl SpeechEngine for VoskSpeech {
    fn id(&self) -> &str {
        "vosk"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn recognizer(&self) -> GatewayResult<Box<dyn Recognizer>> {
        let mut recognizer = vosk::Recognizer::new(&self.model, self.sample_rate as f32)
            .ok_or_else(|| GatewayError::Transcription("failed to create recognizer".to_string()))?;
        recognizer.set_words(true);
        Ok(Box::new(VoskRecognizer { recognizer }))
    }
}

struct VoskRecognizer {
    recognizer: vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept(&mut self, samples: &[i16]) -> GatewayResult<Transcript> {
        match self.recognizer.accept_waveform(samples) {
            DecodingState::Finalized => Ok(Transcript::Final(
                self.recognizer
                    .result()
                    .single()
                    .map(|result| result.text.trim().to_string())
                    .unwrap_or_default(),
            )),
            DecodingState::Running => Ok(Transcript::Partial(
                self.recognizer.partial_result().partial.trim().to_string(),
            )),
            DecodingState::Failed => Err(GatewayError::Transcription(
                "recognizer rejected audio frame".to_string(),
            )),
        }
    }
}
