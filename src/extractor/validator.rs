// Transcript quality validation - six ordered gates, first failure wins
//
// Verdicts are data, never errors: the orchestrator reads a rejection as
// "try the next strategy". Pure function of its input, no I/O, never panics.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{TextSegment, TranscriptStats};

lazy_static! {
    // Eight or more consecutive 1-2 letter tokens reads as keyboard noise
    static ref SHORT_TOKEN_RUN_RE: Regex =
        Regex::new(r"(?i)\b(?:[a-z]{1,2}\s+){8,}[a-z]{1,2}\b").unwrap();
}

/// Categorized validation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictCode {
    Valid,
    InvalidStructure,
    ExtractionFailed,
    InsufficientLength,
    PoorQuality,
    InvalidSegments,
    ExcessiveRepetition,
    ValidationError,
}

impl std::fmt::Display for VerdictCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::InvalidStructure => "INVALID_STRUCTURE",
            Self::ExtractionFailed => "EXTRACTION_FAILED",
            Self::InsufficientLength => "INSUFFICIENT_LENGTH",
            Self::PoorQuality => "POOR_QUALITY",
            Self::InvalidSegments => "INVALID_SEGMENTS",
            Self::ExcessiveRepetition => "EXCESSIVE_REPETITION",
            Self::ValidationError => "VALIDATION_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Accept/reject decision with diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    pub code: VerdictCode,
    pub message: String,
    pub stats: Option<TranscriptStats>,
}

impl Verdict {
    fn accept(stats: TranscriptStats) -> Self {
        Self {
            valid: true,
            code: VerdictCode::Valid,
            message: "transcript accepted".to_string(),
            stats: Some(stats),
        }
    }

    fn reject(code: VerdictCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            code,
            message: message.into(),
            stats: None,
        }
    }

    fn reject_with(code: VerdictCode, message: impl Into<String>, stats: TranscriptStats) -> Self {
        Self {
            valid: false,
            code,
            message: message.into(),
            stats: Some(stats),
        }
    }
}

/// Validation thresholds, explicit and overridable per call
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum transcript length in characters
    pub min_transcript_chars: usize,
    /// Minimum number of segments, when the candidate carries segments
    pub min_segment_count: usize,
    /// Minimum mean segment length in characters
    pub min_avg_segment_chars: f64,
    /// Minimum distinct words; capped at a tenth of the token count so short
    /// legitimate captions are not rejected for vocabulary alone
    pub min_unique_words: usize,
    /// Highest tolerated `1 - unique/total` segment ratio
    pub max_repetition_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_transcript_chars: 100,
            min_segment_count: 3,
            min_avg_segment_chars: 5.0,
            min_unique_words: 15,
            max_repetition_ratio: 0.7,
        }
    }
}

impl ValidationConfig {
    pub fn with_min_transcript_chars(mut self, chars: usize) -> Self {
        self.min_transcript_chars = chars;
        self
    }

    pub fn with_min_segment_count(mut self, count: usize) -> Self {
        self.min_segment_count = count;
        self
    }

    pub fn with_min_unique_words(mut self, words: usize) -> Self {
        self.min_unique_words = words;
        self
    }

    pub fn with_max_repetition_ratio(mut self, ratio: f64) -> Self {
        self.max_repetition_ratio = ratio;
        self
    }
}

/// Candidate normalized into a judgeable shape
struct Normalized {
    transcript: String,
    /// None for bare-string candidates; segment gates only run when present
    segments: Option<Vec<String>>,
}

pub struct TranscriptValidator {
    config: ValidationConfig,
}

impl TranscriptValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a strategy candidate
    pub fn validate_segments(&self, segments: &[TextSegment]) -> Verdict {
        if segments.is_empty() {
            return Verdict::reject(VerdictCode::InvalidStructure, "candidate has no segments");
        }
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let transcript = texts.join(" ");
        self.run_gates(Normalized {
            transcript,
            segments: Some(texts),
        })
    }

    /// Validate arbitrary candidate data: a string, an array of strings, an
    /// array of text-bearing objects, or a wrapper object around one of those
    pub fn validate(&self, candidate: &Value) -> Verdict {
        match normalize(candidate, 0) {
            Ok(normalized) => self.run_gates(normalized),
            Err(verdict) => verdict,
        }
    }

    fn run_gates(&self, input: Normalized) -> Verdict {
        let Normalized {
            transcript,
            segments,
        } = input;

        let stats = compute_stats(&transcript, segments.as_deref());

        // Length
        if stats.length < self.config.min_transcript_chars {
            return Verdict::reject_with(
                VerdictCode::InsufficientLength,
                format!(
                    "transcript is {} characters, need {}",
                    stats.length, self.config.min_transcript_chars
                ),
                stats,
            );
        }
        if let Some(texts) = segments.as_deref() {
            if texts.len() < self.config.min_segment_count {
                return Verdict::reject_with(
                    VerdictCode::InsufficientLength,
                    format!(
                        "{} segments, need {}",
                        texts.len(),
                        self.config.min_segment_count
                    ),
                    stats,
                );
            }
            if stats.average_segment_length < self.config.min_avg_segment_chars {
                return Verdict::reject_with(
                    VerdictCode::InsufficientLength,
                    format!(
                        "mean segment length {:.1} below {:.1}",
                        stats.average_segment_length, self.config.min_avg_segment_chars
                    ),
                    stats,
                );
            }
        }

        // Quality
        let word_count = count_words(&transcript);
        let required_unique = std::cmp::max(
            1,
            std::cmp::min(self.config.min_unique_words, word_count / 10),
        );
        if stats.unique_word_count < required_unique {
            return Verdict::reject_with(
                VerdictCode::PoorQuality,
                format!(
                    "{} unique words across {} tokens, need {}",
                    stats.unique_word_count, word_count, required_unique
                ),
                stats,
            );
        }
        if let Some(reason) = gibberish_reason(&transcript) {
            return Verdict::reject_with(VerdictCode::PoorQuality, reason, stats);
        }

        // Segments
        if let Some(texts) = segments.as_deref() {
            if texts.iter().any(|t| t.trim().is_empty()) {
                return Verdict::reject_with(
                    VerdictCode::InvalidSegments,
                    "candidate contains an empty segment",
                    stats,
                );
            }
            let tiny = texts.iter().filter(|t| t.chars().count() < 2).count();
            if tiny * 2 > texts.len() {
                return Verdict::reject_with(
                    VerdictCode::InvalidSegments,
                    format!("{} of {} segments are under 2 characters", tiny, texts.len()),
                    stats,
                );
            }

            // Repetition
            if stats.repetition_ratio > self.config.max_repetition_ratio {
                return Verdict::reject_with(
                    VerdictCode::ExcessiveRepetition,
                    format!(
                        "repetition ratio {:.2} exceeds {:.2}",
                        stats.repetition_ratio, self.config.max_repetition_ratio
                    ),
                    stats,
                );
            }
        }

        Verdict::accept(stats)
    }
}

fn compute_stats(transcript: &str, segments: Option<&[String]>) -> TranscriptStats {
    let length = transcript.chars().count();
    let (segment_count, average_segment_length, repetition_ratio) = match segments {
        Some(texts) if !texts.is_empty() => {
            let total_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
            let unique: HashSet<&str> = texts.iter().map(|t| t.as_str()).collect();
            (
                texts.len(),
                total_chars as f64 / texts.len() as f64,
                1.0 - unique.len() as f64 / texts.len() as f64,
            )
        }
        _ => (1, length as f64, 0.0),
    };

    TranscriptStats {
        length,
        segment_count,
        unique_word_count: unique_words(transcript).len(),
        average_segment_length,
        repetition_ratio,
    }
}

fn unique_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn count_words(text: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .count()
}

/// Cheap spam heuristics; returns the matched reason for the verdict message
fn gibberish_reason(transcript: &str) -> Option<&'static str> {
    if !transcript.chars().any(|c| c.is_alphabetic()) {
        return Some("no letters in transcript");
    }
    if transcript
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace())
    {
        return Some("transcript is digits only");
    }
    if has_long_char_run(transcript, 10) {
        return Some("one character repeated more than 10 times");
    }
    if SHORT_TOKEN_RUN_RE.is_match(transcript) {
        return Some("long run of one/two-letter tokens");
    }
    None
}

fn has_long_char_run(text: &str, limit: usize) -> bool {
    let mut last = None;
    let mut run = 0usize;
    for c in text.chars() {
        if Some(c) == last {
            run += 1;
            if run > limit {
                return true;
            }
        } else {
            last = Some(c);
            run = 1;
        }
    }
    false
}

/// Turn arbitrary candidate data into `(transcript, segments)`
fn normalize(candidate: &Value, depth: usize) -> Result<Normalized, Verdict> {
    if depth > 2 {
        return Err(Verdict::reject(
            VerdictCode::ValidationError,
            "candidate nesting too deep to normalize",
        ));
    }

    match candidate {
        Value::Null => Err(Verdict::reject(
            VerdictCode::InvalidStructure,
            "candidate is null",
        )),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(Verdict::reject(
                    VerdictCode::InvalidStructure,
                    "candidate is an empty string",
                ));
            }
            Ok(Normalized {
                transcript: trimmed.to_string(),
                segments: None,
            })
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Err(Verdict::reject(
                    VerdictCode::InvalidStructure,
                    "candidate is an empty array",
                ));
            }
            let texts: Vec<String> = items.iter().filter_map(element_text).collect();
            if texts.is_empty() {
                return Err(Verdict::reject(
                    VerdictCode::ExtractionFailed,
                    "no text-bearing elements in candidate array",
                ));
            }
            let transcript = texts
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Normalized {
                transcript,
                segments: Some(texts),
            })
        }
        Value::Object(map) => {
            // Direct text-bearing string field wins
            for key in ["transcript", "text", "content"] {
                if let Some(Value::String(s)) = map.get(key) {
                    if !s.trim().is_empty() {
                        return normalize(&Value::String(s.clone()), depth + 1);
                    }
                }
            }
            // Otherwise the first array-valued property that yields text,
            // well-known keys before the rest
            let known = ["segments", "transcript", "events", "captions", "items", "lines"];
            let candidates = known
                .iter()
                .filter_map(|k| map.get(*k))
                .chain(map.values())
                .filter(|v| v.is_array());
            for value in candidates {
                if let Ok(normalized) = normalize(value, depth + 1) {
                    return Ok(normalized);
                }
            }
            Err(Verdict::reject(
                VerdictCode::ExtractionFailed,
                "no extractable text in candidate object",
            ))
        }
        _ => Err(Verdict::reject(
            VerdictCode::InvalidStructure,
            "candidate is not text-shaped",
        )),
    }
}

/// Text carried by one array element, if any
fn element_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            for key in ["text", "content", "caption", "transcript", "utf8"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }
            // json3-style events nest text one level down in `segs`
            if let Some(Value::Array(segs)) = map.get("segs") {
                let joined: String = segs
                    .iter()
                    .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> TranscriptValidator {
        TranscriptValidator::new(ValidationConfig::default())
    }

    fn wordy_segments() -> Vec<TextSegment> {
        vec![
            TextSegment::new("welcome back everyone to another deep dive episode"),
            TextSegment::new("today we are exploring how compilers allocate registers"),
            TextSegment::new("graph coloring remains the classic approach in practice"),
            TextSegment::new("linear scan trades quality for much faster compile times"),
        ]
    }

    #[test]
    fn test_accepts_reasonable_transcript() {
        let verdict = validator().validate_segments(&wordy_segments());
        assert!(verdict.valid, "{}", verdict.message);
        assert_eq!(verdict.code, VerdictCode::Valid);
        let stats = verdict.stats.unwrap();
        assert_eq!(stats.segment_count, 4);
        assert!(stats.unique_word_count >= 15);
    }

    #[test]
    fn test_idempotent_on_accepted_output() {
        let verdict = validator().validate_segments(&wordy_segments());
        assert!(verdict.valid);
        let transcript = wordy_segments()
            .iter()
            .map(|s| s.text.clone())
            .collect::<Vec<_>>()
            .join(" ");
        let again = validator().validate(&Value::String(transcript));
        assert!(again.valid, "{}", again.message);
        assert_eq!(again.code, VerdictCode::Valid);
    }

    #[test]
    fn test_length_gate() {
        let verdict = validator().validate_segments(&[TextSegment::new("Hi")]);
        assert_eq!(verdict.code, VerdictCode::InsufficientLength);
    }

    #[test]
    fn test_repetition_gate() {
        let segments: Vec<TextSegment> = (0..10)
            .map(|_| TextSegment::new("same content repeated"))
            .collect();
        let verdict = validator().validate_segments(&segments);
        assert_eq!(verdict.code, VerdictCode::ExcessiveRepetition);
        assert!(verdict.stats.unwrap().repetition_ratio > 0.7);
    }

    #[test]
    fn test_quality_gate_low_vocabulary() {
        let segments: Vec<TextSegment> = (0..20)
            .map(|_| TextSegment::new("test test test"))
            .collect();
        let verdict = validator().validate_segments(&segments);
        assert_eq!(verdict.code, VerdictCode::PoorQuality);
    }

    #[test]
    fn test_quality_gate_char_run() {
        let transcript = "a".repeat(150);
        let verdict = validator().validate(&Value::String(transcript));
        assert_eq!(verdict.code, VerdictCode::PoorQuality);
    }

    #[test]
    fn test_quality_gate_digits_only() {
        let transcript = (0..40).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let verdict = validator().validate(&Value::String(transcript));
        assert_eq!(verdict.code, VerdictCode::PoorQuality);
    }

    #[test]
    fn test_structure_gate() {
        assert_eq!(
            validator().validate(&Value::Null).code,
            VerdictCode::InvalidStructure
        );
        assert_eq!(
            validator().validate(&json!("")).code,
            VerdictCode::InvalidStructure
        );
        assert_eq!(
            validator().validate(&json!([])).code,
            VerdictCode::InvalidStructure
        );
        assert_eq!(
            validator().validate(&json!(42)).code,
            VerdictCode::InvalidStructure
        );
    }

    #[test]
    fn test_extraction_gate() {
        let candidate = json!([{ "start": 0.0 }, { "start": 1.0 }]);
        assert_eq!(
            validator().validate(&candidate).code,
            VerdictCode::ExtractionFailed
        );
    }

    #[test]
    fn test_segments_gate_empty_segment() {
        let candidate = json!([
            "a first segment that carries plenty of reasonable caption text",
            "",
            "a third segment that also carries plenty of reasonable caption text here",
        ]);
        let verdict = validator().validate(&candidate);
        assert_eq!(verdict.code, VerdictCode::InvalidSegments);
    }

    #[test]
    fn test_normalizes_array_of_objects() {
        let candidate = json!([
            { "text": "welcome back everyone to another deep dive episode" },
            { "text": "today we are exploring how compilers allocate registers" },
            { "text": "graph coloring remains the classic approach in practice" },
        ]);
        let verdict = validator().validate(&candidate);
        assert!(verdict.valid, "{}", verdict.message);
    }

    #[test]
    fn test_normalizes_wrapper_object_with_events() {
        let candidate = json!({
            "wireMagic": "pb3",
            "events": [
                { "tStartMs": 0, "segs": [{ "utf8": "welcome back everyone to another deep dive episode" }] },
                { "tStartMs": 2100, "segs": [{ "utf8": "today we are exploring how compilers allocate registers" }] },
                { "tStartMs": 4800, "segs": [{ "utf8": "graph coloring remains the classic approach in practice" }] },
            ]
        });
        let verdict = validator().validate(&candidate);
        assert!(verdict.valid, "{}", verdict.message);
    }

    #[test]
    fn test_normalizes_nested_transcript_field() {
        let text = "today we are exploring how compilers allocate registers \
                    and why graph coloring remains the classic approach in practice";
        let verdict = validator().validate(&json!({ "transcript": text }));
        assert!(verdict.valid, "{}", verdict.message);
    }

    #[test]
    fn test_thresholds_are_overridable() {
        let config = ValidationConfig::default().with_min_transcript_chars(10);
        let relaxed = TranscriptValidator::new(config);
        let verdict = relaxed.validate(&json!("eleven chars of sensible text here"));
        assert!(verdict.valid, "{}", verdict.message);
    }
}
