// Strategy orchestrator - priority-ordered fallback with validation
//
// Strategies run strictly in ascending priority. A strategy error or a
// rejected candidate is recorded and the next strategy tried; the first
// candidate that passes validation ends the run. Rejected candidates are
// discarded whole, never merged with a later one.

use tracing::{info, warn};

use super::diagnostics::diagnose_failure;
use super::errors::ExtractError;
use super::models::{join_segments, AttemptOutcome, AttemptRecord, ExtractionResult};
use super::strategies::{VariantPageStrategy, WatchPageStrategy, YtDlpStrategy};
use super::traits::{ExtractionStrategy, ExtractorConfig};
use super::validator::TranscriptValidator;

pub struct TranscriptExtractor {
    config: ExtractorConfig,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl TranscriptExtractor {
    /// Build with the standard strategy registry
    pub fn new(config: ExtractorConfig) -> Self {
        let mut extractor = Self::with_strategies(config, Vec::new());
        extractor.register(Box::new(WatchPageStrategy::new()));
        extractor.register(Box::new(VariantPageStrategy::new()));
        extractor.register(Box::new(YtDlpStrategy::new()));
        extractor
    }

    /// Build with a caller-supplied registry
    pub fn with_strategies(
        config: ExtractorConfig,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Self {
        let mut extractor = Self {
            config,
            strategies: Vec::new(),
        };
        for strategy in strategies {
            extractor.register(strategy);
        }
        extractor
    }

    /// Add a strategy, keeping the registry sorted by ascending priority
    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.priority());
    }

    /// Extract a validated transcript for one video
    ///
    /// Returns the first candidate that passes validation, with the history
    /// of every failed attempt before it. Fails with
    /// `ExtractError::NoValidTranscript` carrying the full history when every
    /// strategy is exhausted. Callers wanting an outer wall-clock budget race
    /// this future against `tokio::time::timeout`; an abandoned call does not
    /// guarantee its in-flight request is aborted.
    pub async fn extract_transcript(
        &self,
        video_id: &str,
    ) -> Result<ExtractionResult, ExtractError> {
        let validator = TranscriptValidator::new(self.config.validation.clone());
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for strategy in &self.strategies {
            info!(video_id, strategy = strategy.name(), "attempting extraction");

            match strategy.attempt(video_id, &self.config).await {
                Ok(segments) => {
                    let verdict = validator.validate_segments(&segments);
                    match verdict.stats {
                        Some(stats) if verdict.valid => {
                            info!(
                                video_id,
                                strategy = strategy.name(),
                                segments = segments.len(),
                                chars = stats.length,
                                failed_attempts = attempts.len(),
                                "transcript accepted"
                            );
                            return Ok(ExtractionResult {
                                transcript: join_segments(&segments),
                                segments,
                                strategy_used: strategy.name().to_string(),
                                stats,
                                attempts,
                            });
                        }
                        _ => {
                            warn!(
                                video_id,
                                strategy = strategy.name(),
                                code = %verdict.code,
                                detail = %verdict.message,
                                "candidate rejected"
                            );
                            attempts.push(AttemptRecord {
                                strategy: strategy.name().to_string(),
                                outcome: AttemptOutcome::Rejected(verdict.code),
                                detail: verdict.message,
                            });
                        }
                    }
                }
                Err(error) => {
                    let detail = error.to_string();
                    match diagnose_failure(&detail) {
                        Some(reason) => warn!(
                            video_id,
                            strategy = strategy.name(),
                            reason = reason.description(),
                            retryable = reason.is_retryable(),
                            detail = %detail,
                            "strategy failed"
                        ),
                        None => warn!(
                            video_id,
                            strategy = strategy.name(),
                            detail = %detail,
                            "strategy failed"
                        ),
                    }
                    attempts.push(AttemptRecord {
                        strategy: strategy.name().to_string(),
                        outcome: error.outcome(),
                        detail,
                    });
                }
            }
        }

        warn!(
            video_id,
            attempts = attempts.len(),
            "all strategies exhausted"
        );
        Err(ExtractError::NoValidTranscript { attempts })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::extractor::models::TextSegment;
    use crate::extractor::validator::VerdictCode;

    /// What a scripted strategy hands back on every attempt
    enum Script {
        Good,
        Looped,
        NetworkError,
    }

    struct ScriptedStrategy {
        name: &'static str,
        priority: u8,
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedStrategy {
        fn new(
            name: &'static str,
            priority: u8,
            script: Script,
        ) -> (Box<dyn ExtractionStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Box::new(Self {
                name,
                priority,
                script,
                calls: Arc::clone(&calls),
            });
            (strategy, calls)
        }
    }

    fn good_segments() -> Vec<TextSegment> {
        vec![
            TextSegment::new("welcome back everyone to another deep dive episode"),
            TextSegment::new("today we are exploring how compilers allocate registers"),
            TextSegment::new("graph coloring remains the classic approach in practice"),
            TextSegment::new("linear scan trades quality for much faster compile times"),
        ]
    }

    #[async_trait]
    impl ExtractionStrategy for ScriptedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn attempt(
            &self,
            _video_id: &str,
            _config: &ExtractorConfig,
        ) -> Result<Vec<TextSegment>, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Good => Ok(good_segments()),
                Script::Looped => Ok((0..10)
                    .map(|_| TextSegment::new("same content repeated"))
                    .collect()),
                Script::NetworkError => Err(ExtractError::Status {
                    status: 429,
                    url: "https://www.youtube.com/watch?v=abc".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_first_valid_candidate_short_circuits() {
        let (first, first_calls) = ScriptedStrategy::new("first", 0, Script::Good);
        let (second, second_calls) = ScriptedStrategy::new("second", 1, Script::Good);
        let extractor = TranscriptExtractor::with_strategies(
            ExtractorConfig::default(),
            vec![first, second],
        );

        let result = extractor.extract_transcript("abc").await.unwrap();
        assert_eq!(result.strategy_used, "first");
        assert!(result.attempts.is_empty());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_candidate_falls_through() {
        let (first, _) = ScriptedStrategy::new("first", 0, Script::Looped);
        let (second, _) = ScriptedStrategy::new("second", 1, Script::Good);
        let extractor = TranscriptExtractor::with_strategies(
            ExtractorConfig::default(),
            vec![first, second],
        );

        let result = extractor.extract_transcript("abc").await.unwrap();
        assert_eq!(result.strategy_used, "second");
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].strategy, "first");
        assert_eq!(
            result.attempts[0].outcome,
            AttemptOutcome::Rejected(VerdictCode::ExcessiveRepetition)
        );
        assert_eq!(result.transcript, join_segments(&result.segments));
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_full_history() {
        let (first, _) = ScriptedStrategy::new("first", 0, Script::NetworkError);
        let (second, _) = ScriptedStrategy::new("second", 1, Script::NetworkError);
        let (third, _) = ScriptedStrategy::new("third", 2, Script::NetworkError);
        let extractor = TranscriptExtractor::with_strategies(
            ExtractorConfig::default(),
            vec![first, second, third],
        );

        let attempts = match extractor.extract_transcript("abc").await.unwrap_err() {
            ExtractError::NoValidTranscript { attempts } => attempts,
            other => panic!("expected exhaustion, got {}", other),
        };
        assert_eq!(attempts.len(), 3);
        assert_eq!(
            attempts.iter().map(|a| a.strategy.as_str()).collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
        assert!(attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::NetworkError));
    }

    #[tokio::test]
    async fn test_registry_sorts_by_priority() {
        let (low, low_calls) = ScriptedStrategy::new("low", 3, Script::Good);
        let (high, high_calls) = ScriptedStrategy::new("high", 1, Script::Good);
        // Registered out of order; priority decides who runs.
        let extractor = TranscriptExtractor::with_strategies(
            ExtractorConfig::default(),
            vec![low, high],
        );

        let result = extractor.extract_transcript("abc").await.unwrap();
        assert_eq!(result.strategy_used, "high");
        assert_eq!(high_calls.load(Ordering::SeqCst), 1);
        assert_eq!(low_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_after_failures_retains_history() {
        let (first, _) = ScriptedStrategy::new("first", 0, Script::NetworkError);
        let (second, _) = ScriptedStrategy::new("second", 1, Script::Looped);
        let (third, _) = ScriptedStrategy::new("third", 2, Script::Good);
        let extractor = TranscriptExtractor::with_strategies(
            ExtractorConfig::default(),
            vec![first, second, third],
        );

        let result = extractor.extract_transcript("abc").await.unwrap();
        assert_eq!(result.strategy_used, "third");
        assert_eq!(result.attempts.len(), 2);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::NetworkError);
        assert_eq!(
            result.attempts[1].outcome,
            AttemptOutcome::Rejected(VerdictCode::ExcessiveRepetition)
        );
        assert!(result.stats.unique_word_count >= 15);
    }
}
