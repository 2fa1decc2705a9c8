use crate::audio::domain::audio_segment::AudioSegment;

use super::transcript::TranscriptSegment;

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on 16 kHz mono audio and return the
/// decoded segments in playback order.
pub trait SpeechRecognizer: Send {
    fn transcribe(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<TranscriptSegment>, Box<dyn std::error::Error>>;
}
