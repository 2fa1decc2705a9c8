/// One decoded segment as produced by the recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub no_speech_probability: f32,
}

/// Ordered segments for a whole file, plus the length of the decoded audio.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
    duration: f64,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>, duration: f64) -> Self {
        Self { segments, duration }
    }

    pub fn empty(duration: f64) -> Self {
        Self::new(Vec::new(), duration)
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }

    /// Segment texts joined with a single space.
    ///
    /// Whisper emits segment text with a leading space; each segment is
    /// trimmed and blank segments are skipped so the result has no doubled
    /// or dangling whitespace.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn segment(text: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start_time: start,
            end_time: end,
            no_speech_probability: 0.01,
        }
    }

    #[rstest]
    #[case(&[" Hello", " world."], "Hello world.")]
    #[case(&[" The quick brown fox", " jumps over", " the lazy dog."], "The quick brown fox jumps over the lazy dog.")]
    #[case(&["  spaced  ", "", "   ", "out "], "spaced out")]
    #[case(&[" single"], "single")]
    #[case(&[], "")]
    fn test_text_joins_trimmed_segments(#[case] parts: &[&str], #[case] expected: &str) {
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, p)| segment(p, i as f64, i as f64 + 1.0))
            .collect();
        let transcript = Transcript::new(segments, parts.len() as f64);
        assert_eq!(transcript.text(), expected);
    }

    #[test]
    fn test_text_keeps_segment_order() {
        let transcript = Transcript::new(
            vec![segment(" first", 0.0, 1.0), segment(" second", 1.0, 2.0)],
            2.0,
        );
        assert_eq!(transcript.text(), "first second");
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::empty(4.5);
        assert!(transcript.is_empty());
        assert_eq!(transcript.text(), "");
        assert_eq!(transcript.duration(), 4.5);
        assert!(transcript.segments().is_empty());
    }

    #[test]
    fn test_blank_segments_count_as_empty() {
        let transcript = Transcript::new(vec![segment("  ", 0.0, 1.0)], 1.0);
        assert!(transcript.is_empty());
    }
}
