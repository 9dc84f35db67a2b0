//! Resilient caption-extraction pipeline
//!
//! The host job runner builds a `TranscriptExtractor` and calls
//! `extract_transcript`; everything else (job store, HTTP API, summarization)
//! lives outside this crate.
//!
//! ```no_run
//! use transcript_extractor::{ExtractorConfig, TranscriptExtractor};
//!
//! # async fn run() -> Result<(), transcript_extractor::ExtractError> {
//! let config = ExtractorConfig::default().with_language(Some("en".to_string()));
//! let extractor = TranscriptExtractor::new(config);
//! let result = extractor.extract_transcript("dQw4w9WgXcQ").await?;
//! println!("{} via {}", result.stats.length, result.strategy_used);
//! # Ok(())
//! # }
//! ```

pub mod extractor;

pub use extractor::{
    AttemptOutcome, AttemptRecord, CaptionTrack, ExtractError, ExtractionResult,
    ExtractionStrategy, ExtractorConfig, TextSegment, TranscriptExtractor, TranscriptStats,
    TranscriptValidator, ValidationConfig, Verdict, VerdictCode,
};
