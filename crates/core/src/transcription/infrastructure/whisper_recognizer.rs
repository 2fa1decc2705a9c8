use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::constants::{MAX_BEAM_SIZE, WHISPER_SAMPLE_RATE};
use crate::transcription::domain::model_spec::{DecodeOptions, Device};
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;
use crate::transcription::domain::transcript::TranscriptSegment;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The ggml model is loaded once in [`WhisperRecognizer::new`]; each call to
/// `transcribe` allocates a fresh decoder state.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    context: WhisperContext,
    options: DecodeOptions,
}

impl WhisperRecognizer {
    pub fn new(
        model_path: &Path,
        device: Device,
        options: DecodeOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.is_file() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        if !(1..=MAX_BEAM_SIZE).contains(&options.beam_size) {
            return Err(format!(
                "Beam size must be between 1 and {MAX_BEAM_SIZE}, got {}",
                options.beam_size
            )
            .into());
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(device.use_gpu());

        log::info!("Loading Whisper model {} on {device}", model_path.display());
        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            ctx_params,
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        Ok(Self {
            model_path: model_path.to_path_buf(),
            context,
            options,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn sampling_strategy(&self) -> Result<SamplingStrategy, Box<dyn std::error::Error>> {
        if self.options.beam_size > 1 {
            Ok(SamplingStrategy::BeamSearch {
                beam_size: i32::try_from(self.options.beam_size)?,
                patience: -1.0,
            })
        } else {
            Ok(SamplingStrategy::Greedy { best_of: 1 })
        }
    }
}

impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("model_path", &self.model_path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<TranscriptSegment>, Box<dyn std::error::Error>> {
        if audio.sample_rate() != WHISPER_SAMPLE_RATE {
            return Err(format!(
                "Whisper expects {WHISPER_SAMPLE_RATE} Hz audio, got {} Hz",
                audio.sample_rate()
            )
            .into());
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let language = self.options.language.as_deref().unwrap_or("auto");

        let mut params = FullParams::new(self.sampling_strategy()?);
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        let threads = i32::try_from(self.options.threads.max(1))
            .map_err(|_| format!("Thread count out of range: {}", self.options.threads))?;
        params.set_n_threads(threads);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let num_segments = state.full_n_segments();
        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let text = segment
                .to_str_lossy()
                .map_err(|e| format!("Failed to read segment {seg_idx}: {e}"))?;

            // Segment timestamps are in centiseconds (10ms units)
            segments.push(TranscriptSegment {
                text: text.into_owned(),
                start_time: segment.start_timestamp() as f64 / 100.0,
                end_time: segment.end_timestamp() as f64 / 100.0,
                no_speech_probability: segment.no_speech_probability(),
            });
        }

        log::debug!("Whisper produced {} segment(s)", segments.len());
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model_resolver;
    use crate::transcription::domain::model_spec::ModelSpec;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperRecognizer::new(
            Path::new("/nonexistent/model.bin"),
            Device::Cpu,
            DecodeOptions::default(),
        );
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }

    #[test]
    fn test_new_rejects_zero_beam_size() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let options = DecodeOptions {
            beam_size: 0,
            ..DecodeOptions::default()
        };
        let err = WhisperRecognizer::new(tmp.path(), Device::Cpu, options)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Beam size"), "got: {err}");
    }

    #[test]
    fn test_new_rejects_beam_size_above_decoder_limit() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        for beam_size in [MAX_BEAM_SIZE + 1, usize::MAX] {
            let options = DecodeOptions {
                beam_size,
                ..DecodeOptions::default()
            };
            let err = WhisperRecognizer::new(tmp.path(), Device::Cpu, options)
                .unwrap_err()
                .to_string();
            assert!(err.contains("between 1 and 8"), "got: {err}");
        }
    }

    #[test]
    fn test_new_rejects_corrupt_model_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"not a ggml file").unwrap();
        let result = WhisperRecognizer::new(tmp.path(), Device::Cpu, DecodeOptions::default());
        assert!(result.is_err());
    }

    fn load_default_recognizer() -> WhisperRecognizer {
        let spec = ModelSpec::default();
        let model_path =
            model_resolver::resolve(&spec.file_name(), &spec.download_url(), None, None)
                .expect("Failed to resolve whisper model");
        WhisperRecognizer::new(&model_path, Device::Cpu, DecodeOptions::default())
            .expect("Failed to create recognizer")
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_transcribe_rejects_wrong_sample_rate() {
        let recognizer = load_default_recognizer();
        let audio = AudioSegment::new(vec![0.0; 44100], 44100);
        assert!(recognizer.transcribe(&audio).is_err());
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_transcribe_does_not_crash_on_sine_wave() {
        let recognizer = load_default_recognizer();

        let len = 3 * WHISPER_SAMPLE_RATE as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / WHISPER_SAMPLE_RATE as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32 * 0.3
            })
            .collect();
        let audio = AudioSegment::new(samples, WHISPER_SAMPLE_RATE);

        let result = recognizer.transcribe(&audio);
        assert!(result.is_ok(), "Transcription should not error: {result:?}");
        for seg in result.unwrap() {
            assert!(seg.end_time >= seg.start_time);
        }
    }
}
