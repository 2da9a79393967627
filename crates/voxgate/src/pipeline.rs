use std::sync::Arc;

use crate::command::Command;
use crate::dispatcher::Dispatcher;
use crate::error::{GatewayError, GatewayResult};
use crate::resolver::Resolver;
use crate::speech::{
    decode_pcm16le, listening_status, transcription_failure, Recognizer, SharedSpeechEngine,
    Transcript,
};

/// Decode, resolve and dispatch for one inbound message.
#[derive(Clone)]
pub struct Pipeline {
    resolver: Arc<Resolver>,
    dispatcher: Dispatcher,
    speech: SharedSpeechEngine,
}

/// Per-connection audio state. The recognizer is created on the first audio frame and
/// kept for the rest of the connection.
#[derive(Default)]
pub struct AudioStream {
    recognizer: Option<Box<dyn Recognizer>>,
}

impl Pipeline {
    pub fn new(resolver: Arc<Resolver>, dispatcher: Dispatcher, speech: SharedSpeechEngine) -> Self {
        Self {
            resolver,
            dispatcher,
            speech,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn speech(&self) -> &SharedSpeechEngine {
        &self.speech
    }

    pub async fn handle_transcript(&self, transcript: &str) -> String {
        tracing::info!("transcript: {transcript:?}");
        let command = self.resolver.resolve(transcript).await;
        self.dispatch(transcript, &command).await
    }

    /// Transcribe one audio frame. Only a finalized utterance is resolved and dispatched;
    /// frames that leave the utterance open get a listening status and run nothing. A frame
    /// that fails to transcribe is answered like an unrecognized command carrying the
    /// failure reason.
    pub async fn handle_audio(&self, stream: &mut AudioStream, frame: &[u8]) -> String {
        match self.transcribe(stream, frame).await {
            Ok(Transcript::Final(transcript)) => self.handle_transcript(&transcript).await,
            Ok(Transcript::Partial(partial)) => {
                tracing::debug!("partial transcript: {partial:?}");
                listening_status(&partial)
            }
            Err(error) => {
                tracing::warn!("speech processing failed: {error}");
                let transcript = transcription_failure(&error);
                self.dispatch(&transcript, &Command::unrecognized(transcript.as_str()))
                    .await
            }
        }
    }

    pub async fn transcribe(
        &self,
        stream: &mut AudioStream,
        frame: &[u8],
    ) -> GatewayResult<Transcript> {
        let samples = decode_pcm16le(frame)?;
        let mut recognizer = match stream.recognizer.take() {
            Some(recognizer) => recognizer,
            None => self.speech.recognizer()?,
        };
        let (recognizer, result) = tokio::task::spawn_blocking(move || {
            let result = recognizer.accept(&samples);
            (recognizer, result)
        })
        .await
        .map_err(|error| GatewayError::Transcription(format!("recognizer aborted: {error}")))?;
        stream.recognizer = Some(recognizer);
        result
    }

    async fn dispatch(&self, transcript: &str, command: &Command) -> String {
        tracing::info!("resolved {transcript:?} to {command}");
        let status = self.dispatcher.execute(command).await;
        tracing::info!("dispatch result: {status}");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ApplicationEntry, ApplicationInventory};
    use crate::platform::Platform;
    use crate::speech::{SpeechEngine, UnavailableSpeech};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPlatform {
        toggles: AtomicUsize,
        locks: AtomicUsize,
    }

    impl Platform for CountingPlatform {
        fn lock_screen(&self) -> GatewayResult<()> {
            self.locks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn toggle_media(&self) -> GatewayResult<()> {
            self.toggles.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn launch(&self, _path: &Path) -> GatewayResult<()> {
            Ok(())
        }
    }

    /// Replays a fixed script of results, one per frame, then repeats the last one.
    struct ScriptedSpeech {
        script: Vec<Transcript>,
    }

    struct ScriptedRecognizer {
        script: Vec<Transcript>,
        next: usize,
    }

    impl ScriptedSpeech {
        fn new(script: Vec<Transcript>) -> SharedSpeechEngine {
            Arc::new(Self { script })
        }
    }

    impl SpeechEngine for ScriptedSpeech {
        fn id(&self) -> &str {
            "scripted"
        }

        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn recognizer(&self) -> GatewayResult<Box<dyn Recognizer>> {
            Ok(Box::new(ScriptedRecognizer {
                script: self.script.clone(),
                next: 0,
            }))
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn accept(&mut self, _samples: &[i16]) -> GatewayResult<Transcript> {
            let index = self.next.min(self.script.len() - 1);
            self.next += 1;
            Ok(self.script[index].clone())
        }
    }

    fn partial(text: &str) -> Transcript {
        Transcript::Partial(text.to_string())
    }

    fn finished(text: &str) -> Transcript {
        Transcript::Final(text.to_string())
    }

    fn pipeline(speech: SharedSpeechEngine) -> Pipeline {
        pipeline_on(speech, Arc::new(CountingPlatform::default()))
    }

    fn pipeline_on(speech: SharedSpeechEngine, platform: Arc<CountingPlatform>) -> Pipeline {
        let inventory = ApplicationInventory::new(vec![ApplicationEntry::new(
            "Visual Studio Code",
            "C:\\VSCode.exe",
        )]);
        Pipeline::new(
            Arc::new(Resolver::new(inventory)),
            Dispatcher::new(platform),
            speech,
        )
    }

    #[tokio::test]
    async fn text_runs_through_resolver_and_dispatcher() {
        let pipeline = pipeline(Arc::new(UnavailableSpeech));
        assert_eq!(
            pipeline.handle_transcript("open visual studio code").await,
            "Opened visual studio code"
        );
        assert_eq!(
            pipeline.handle_transcript("please pause the music").await,
            "Pausing active media"
        );
        assert_eq!(
            pipeline.handle_transcript("open slack").await,
            "ERROR: Application Path not Listed"
        );
    }

    #[tokio::test]
    async fn one_utterance_toggles_media_once() {
        let platform = Arc::new(CountingPlatform::default());
        let speech = ScriptedSpeech::new(vec![
            partial("play"),
            partial("play music"),
            finished("play music"),
        ]);
        let pipeline = pipeline_on(speech, platform.clone());
        let mut stream = AudioStream::default();
        let frame = vec![0u8; 320];

        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(pipeline.handle_audio(&mut stream, &frame).await);
        }
        assert_eq!(
            replies,
            vec![
                "Listening - 'play'",
                "Listening - 'play music'",
                "Playing active media"
            ]
        );
        assert_eq!(platform.toggles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recognizer_state_persists_across_frames() {
        let platform = Arc::new(CountingPlatform::default());
        let speech = ScriptedSpeech::new(vec![partial(""), partial("lock"), finished("lock screen")]);
        let pipeline = pipeline_on(speech, platform.clone());
        let mut stream = AudioStream::default();
        let frame = vec![0u8; 320];
        assert_eq!(
            pipeline.transcribe(&mut stream, &frame).await.expect("text"),
            partial("")
        );
        assert_eq!(pipeline.handle_audio(&mut stream, &frame).await, "Listening - 'lock'");
        assert_eq!(platform.locks.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.handle_audio(&mut stream, &frame).await, "Screen locked");
        assert_eq!(platform.locks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_transcription_is_answered_not_dropped() {
        let pipeline = pipeline(Arc::new(UnavailableSpeech));
        let mut stream = AudioStream::default();
        assert_eq!(
            pipeline.handle_audio(&mut stream, &[0u8; 4]).await,
            "ERROR: NotFound - 'ERROR: Speech processing failed - no speech engine is configured' is not a recognized command"
        );
    }

    #[tokio::test]
    async fn odd_length_frame_is_a_transcription_error() {
        let pipeline = pipeline(ScriptedSpeech::new(vec![partial("")]));
        let mut stream = AudioStream::default();
        let error = pipeline
            .transcribe(&mut stream, &[1, 2, 3])
            .await
            .expect_err("should fail");
        assert!(matches!(error, GatewayError::Transcription(_)));
        let status = pipeline.handle_audio(&mut stream, &[1, 2, 3]).await;
        assert!(status.contains("ERROR: Speech processing failed - audio frame has odd length 3"));
    }
}
