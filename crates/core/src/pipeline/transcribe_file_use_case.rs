use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::audio::domain::audio_reader::AudioReader;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;
use crate::transcription::domain::transcript::Transcript;

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("failed to decode audio from {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("{0} has no audio track")]
    NoAudioTrack(PathBuf),
    #[error("transcription failed: {0}")]
    Recognition(#[source] Box<dyn std::error::Error>),
}

/// Decodes one file and runs it through the recognizer.
pub struct TranscribeFileUseCase {
    reader: Box<dyn AudioReader>,
    recognizer: Box<dyn SpeechRecognizer>,
}

impl TranscribeFileUseCase {
    pub fn new(reader: Box<dyn AudioReader>, recognizer: Box<dyn SpeechRecognizer>) -> Self {
        Self { reader, recognizer }
    }

    pub fn execute(&self, input: &Path) -> Result<Transcript, TranscribeError> {
        if !input.is_file() {
            return Err(TranscribeError::InputNotFound(input.to_path_buf()));
        }

        let started = Instant::now();
        let audio = self
            .reader
            .read_audio(input, WHISPER_SAMPLE_RATE)
            .map_err(|source| TranscribeError::Decode {
                path: input.to_path_buf(),
                source,
            })?
            .ok_or_else(|| TranscribeError::NoAudioTrack(input.to_path_buf()))?;
        log::info!(
            "Decoded {:.1}s of audio in {:.2}s",
            audio.duration(),
            started.elapsed().as_secs_f64()
        );

        if audio.is_empty() {
            log::warn!("{} contains no samples", input.display());
            return Ok(Transcript::empty(0.0));
        }

        let started = Instant::now();
        let segments = self
            .recognizer
            .transcribe(&audio)
            .map_err(TranscribeError::Recognition)?;
        log::info!(
            "Transcribed {} segment(s) in {:.2}s",
            segments.len(),
            started.elapsed().as_secs_f64()
        );

        let transcript = Transcript::new(segments, audio.duration());
        if transcript.is_empty() {
            log::warn!("No speech recognized in {}", input.display());
        }
        Ok(transcript)
    }
}
