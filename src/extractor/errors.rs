// Error types for the extraction pipeline

use thiserror::Error;

use super::models::{AttemptOutcome, AttemptRecord};

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Request-level failure (connect, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the source
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    /// No embedded player-configuration document in the fetched page
    #[error("player configuration not found in page")]
    PlayerConfigMissing,

    /// Embedded JSON stayed malformed after bounded repair
    #[error("malformed embedded document: {0}")]
    MalformedDocument(String),

    /// The player configuration offers no caption tracks
    #[error("no caption tracks offered for this video")]
    NoCaptionTracks,

    /// Caption document fetched but no extraction method produced usable text
    #[error("caption document yielded no usable text: {0}")]
    NoUsableText(String),

    /// External tool missing or failed to run
    #[error("external tool error: {0}")]
    Tool(String),

    /// All strategies tried, none produced a validated transcript
    #[error("no strategy produced a valid transcript ({} attempts)", attempts.len())]
    NoValidTranscript { attempts: Vec<AttemptRecord> },
}

impl ExtractError {
    /// Classify a strategy error for the attempt history
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Http(_) | Self::Status { .. } => AttemptOutcome::NetworkError,
            Self::Tool(msg) if looks_like_network(msg) => AttemptOutcome::NetworkError,
            _ => AttemptOutcome::ParseError,
        }
    }
}

fn looks_like_network(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_network_error() {
        let err = ExtractError::Status {
            status: 429,
            url: "https://example.com".to_string(),
        };
        assert_eq!(err.outcome(), AttemptOutcome::NetworkError);
    }

    #[test]
    fn test_parse_failures_classify_as_parse() {
        assert_eq!(
            ExtractError::PlayerConfigMissing.outcome(),
            AttemptOutcome::ParseError
        );
        assert_eq!(
            ExtractError::MalformedDocument("unbalanced braces".to_string()).outcome(),
            AttemptOutcome::ParseError
        );
    }

    #[test]
    fn test_tool_timeout_is_network_error() {
        let err = ExtractError::Tool("yt-dlp timed out after 30s".to_string());
        assert_eq!(err.outcome(), AttemptOutcome::NetworkError);
    }
}
