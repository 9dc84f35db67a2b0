// Caption extraction pipeline
//
// Turns a video page and its caption assets into clean, ordered,
// quality-checked text. Strategies fall back in priority order; every
// candidate passes the validator before being returned.

pub mod diagnostics;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod orchestrator;
pub mod player;
pub mod strategies;
pub mod text;
pub mod tracks;
pub mod traits;
pub mod validator;

pub use diagnostics::{diagnose_failure, FailureReason};
pub use errors::ExtractError;
pub use models::{
    AttemptOutcome, AttemptRecord, CaptionTrack, ExtractionResult, TextSegment, TranscriptStats,
};
pub use orchestrator::TranscriptExtractor;
pub use strategies::{VariantPageStrategy, WatchPageStrategy, YtDlpStrategy};
pub use text::CaptionTextExtractor;
pub use traits::{ExtractionStrategy, ExtractorConfig};
pub use validator::{TranscriptValidator, ValidationConfig, Verdict, VerdictCode};
