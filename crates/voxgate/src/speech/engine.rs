use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};

/// Prefix of the transcript produced when audio could not be transcribed.
pub const TRANSCRIPTION_FAILURE_PREFIX: &str = "ERROR: Speech processing failed - ";

/// Loaded speech model. Each connection gets its own [`Recognizer`] so audio from different
/// clients never mixes.
pub trait SpeechEngine: Send + Sync {
    fn id(&self) -> &str;

    fn sample_rate(&self) -> u32;

    fn recognizer(&self) -> GatewayResult<Box<dyn Recognizer>>;
}

/// What a recognizer knows after one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    /// Best-effort text of an utterance still in progress. It may change with later frames.
    Partial(String),
    /// The engine closed the utterance; this text will not change.
    Final(String),
}

impl Transcript {
    pub fn text(&self) -> &str {
        match self {
            Transcript::Partial(text) | Transcript::Final(text) => text,
        }
    }
}

pub trait Recognizer: Send {
    /// Feed one frame of mono 16-bit samples.
    fn accept(&mut self, samples: &[i16]) -> GatewayResult<Transcript>;
}

pub type SharedSpeechEngine = Arc<dyn SpeechEngine>;

/// Reply to a frame that left an utterance open. Nothing is run on the host for it.
pub fn listening_status(partial: &str) -> String {
    if partial.is_empty() {
        "Listening".to_string()
    } else {
        format!("Listening - '{partial}'")
    }
}

/// Little-endian 16-bit PCM bytes to samples.
pub fn decode_pcm16le(bytes: &[u8]) -> GatewayResult<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(GatewayError::Transcription(format!(
            "audio frame has odd length {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Transcript standing in for audio that failed to transcribe. It resolves like any other
/// unrecognized text.
pub fn transcription_failure(error: &GatewayError) -> String {
    format!("{TRANSCRIPTION_FAILURE_PREFIX}{error}")
}
