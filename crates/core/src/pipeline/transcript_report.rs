use serde::Serialize;

use crate::transcription::domain::transcript::Transcript;

/// The JSON record written to stdout.
///
/// By default only `transcript` is emitted. The detailed form adds the audio
/// duration and per-segment timings.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TranscriptReport {
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<SegmentReport>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Model's probability that the segment holds no speech.
    pub no_speech_prob: f32,
}

impl TranscriptReport {
    pub fn from_transcript(transcript: &Transcript, with_segments: bool) -> Self {
        if !with_segments {
            return Self {
                transcript: transcript.text(),
                duration: None,
                segments: None,
            };
        }

        let segments = transcript
            .segments()
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| SegmentReport {
                start: round_centis(s.start_time),
                end: round_centis(s.end_time),
                text: s.text.trim().to_string(),
                no_speech_prob: s.no_speech_probability,
            })
            .collect();

        Self {
            transcript: transcript.text(),
            duration: Some(round_centis(transcript.duration())),
            segments: Some(segments),
        }
    }

    /// Serialize as a single line of JSON.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::domain::transcript::TranscriptSegment;

    fn transcript(parts: &[(&str, f64, f64)]) -> Transcript {
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, (text, start, end))| TranscriptSegment {
                text: text.to_string(),
                start_time: *start,
                end_time: *end,
                no_speech_probability: i as f32 * 0.25,
            })
            .collect();
        Transcript::new(segments, parts.last().map(|p| p.2).unwrap_or(0.0))
    }

    #[test]
    fn test_plain_report_has_only_transcript_key() {
        let t = transcript(&[(" Hello", 0.0, 1.0), (" world.", 1.0, 2.0)]);
        let json = TranscriptReport::from_transcript(&t, false)
            .to_json_line()
            .unwrap();
        assert_eq!(json, r#"{"transcript":"Hello world."}"#);
    }

    #[test]
    fn test_empty_transcript_serializes_empty_string() {
        let json = TranscriptReport::from_transcript(&Transcript::empty(0.0), false)
            .to_json_line()
            .unwrap();
        assert_eq!(json, r#"{"transcript":""}"#);
    }

    #[test]
    fn test_json_is_single_line_and_escaped() {
        let t = transcript(&[(" She said \"hi\"\nthen left", 0.0, 1.0)]);
        let json = TranscriptReport::from_transcript(&t, true)
            .to_json_line()
            .unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#"She said \"hi\"\nthen left"#), "got: {json}");

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["transcript"], "She said \"hi\"\nthen left");
    }

    #[test]
    fn test_detailed_report_includes_segments() {
        let t = transcript(&[(" One.", 0.0, 1.234), ("  ", 1.234, 1.5), (" Two.", 1.5, 2.999)]);
        let report = TranscriptReport::from_transcript(&t, true);

        assert_eq!(report.transcript, "One. Two.");
        assert_eq!(report.duration, Some(3.0));
        let segments = report.segments.as_ref().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[0],
            SegmentReport {
                start: 0.0,
                end: 1.23,
                text: "One.".to_string(),
                no_speech_prob: 0.0,
            }
        );
        assert_eq!(segments[1].text, "Two.");
        assert_eq!(segments[1].no_speech_prob, 0.5);

        let parsed: serde_json::Value =
            serde_json::from_str(&report.to_json_line().unwrap()).unwrap();
        assert_eq!(parsed["segments"][1]["start"], 1.5);
        assert_eq!(parsed["segments"][1]["no_speech_prob"], 0.5);
    }
}
