// Common data models for the extraction pipeline

use serde::{Deserialize, Serialize};

use super::validator::VerdictCode;

/// One ordered piece of caption text
///
/// Segment order is playback order and must be preserved end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSegment {
    /// Cleaned caption text, never empty
    pub text: String,
    /// Playback offset in seconds, when the source document carried timing
    pub start: Option<f64>,
    /// Display duration in seconds
    pub duration: Option<f64>,
}

impl TextSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            duration: None,
        }
    }

    pub fn timed(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            duration: Some(duration),
        }
    }
}

/// Join segments into a single transcript string
pub fn join_segments(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One caption asset offered by the source
///
/// A video commonly offers several tracks per language: human-authored
/// and machine-generated ("asr"). Selection logic lives in `tracks.rs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// BCP-47-ish language code as reported by the source (e.g. "en", "en-US")
    pub language_code: String,
    /// True for machine-generated tracks
    pub auto_generated: bool,
    /// Where to fetch the caption document
    pub base_url: String,
    /// Human-readable track label
    pub display_name: String,
}

/// Statistics computed by the validator, suitable for structured job logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptStats {
    /// Transcript length in characters
    pub length: usize,
    /// Number of segments (1 for a bare-string candidate)
    pub segment_count: usize,
    /// Distinct lowercase words across the transcript
    pub unique_word_count: usize,
    /// Mean segment length in characters
    pub average_segment_length: f64,
    /// `1 - unique segments / total segments`; 0.0 when untracked
    pub repetition_ratio: f64,
}

/// Why a single strategy attempt did not produce the final transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// Timeout, refused connection, non-2xx response
    NetworkError,
    /// Page or caption document could not be parsed, even after repair
    ParseError,
    /// Strategy produced a candidate but validation refused it
    Rejected(VerdictCode),
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError => write!(f, "network-error"),
            Self::ParseError => write!(f, "parse-error"),
            Self::Rejected(code) => write!(f, "{}", code),
        }
    }
}

/// One entry in the attempt history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Strategy name as reported by `ExtractionStrategy::name`
    pub strategy: String,
    pub outcome: AttemptOutcome,
    /// Error or verdict message for troubleshooting
    pub detail: String,
}

/// Final output of a successful extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Full transcript, segments joined in document order
    pub transcript: String,
    pub segments: Vec<TextSegment>,
    /// Name of the strategy that produced the accepted candidate
    pub strategy_used: String,
    pub stats: TranscriptStats,
    /// Every failed attempt before the accepted one, in priority order
    pub attempts: Vec<AttemptRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_preserves_order() {
        let segments = vec![
            TextSegment::timed("first", 0.0, 1.5),
            TextSegment::timed("second", 1.5, 2.0),
            TextSegment::new("third"),
        ];
        assert_eq!(join_segments(&segments), "first second third");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(AttemptOutcome::NetworkError.to_string(), "network-error");
        assert_eq!(AttemptOutcome::ParseError.to_string(), "parse-error");
        assert_eq!(
            AttemptOutcome::Rejected(VerdictCode::PoorQuality).to_string(),
            "POOR_QUALITY"
        );
    }
}
