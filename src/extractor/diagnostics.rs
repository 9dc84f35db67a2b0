// Failure diagnostics - classifies why a strategy attempt failed
//
// Analyzes failure text (error messages, page markers) to determine:
// - What blocked the extraction (bot wall, rate limit, disabled captions, ...)
// - Whether a later strategy with a different fingerprint is worth trying

use serde::{Deserialize, Serialize};

/// Reasons a caption fetch or page scrape can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Bot/consent challenge served instead of the watch page
    BotChallenge,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// HTTP 403 - general access denied
    Forbidden,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Video exists but the uploader disabled captions
    CaptionsDisabled,

    /// Network timeout (possible soft IP block)
    NetworkTimeout,

    /// Generic/unknown failure
    Unknown,
}

impl FailureReason {
    /// Whether a later strategy with a different fingerprint may still succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BotChallenge
                | Self::RateLimited
                | Self::Forbidden
                | Self::NetworkTimeout
                | Self::Unknown
        )
    }

    /// Whether the condition is tied to the video itself, not the request
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::VideoUnavailable | Self::PrivateVideo | Self::CaptionsDisabled
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::BotChallenge => "Bot or consent challenge served",
            Self::RateLimited => "Rate limited by the source",
            Self::Forbidden => "Access denied (HTTP 403)",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::CaptionsDisabled => "Captions disabled by the uploader",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::Unknown => "Unknown failure",
        }
    }
}

/// Analyze failure text and return the most specific matching reason
pub fn diagnose_failure(detail: &str) -> Option<FailureReason> {
    let lower = detail.to_lowercase();

    // Check patterns in order of specificity

    if lower.contains("captions disabled")
        || lower.contains("subtitles are disabled")
        || lower.contains("no caption tracks")
        || lower.contains("transcript is disabled")
    {
        return Some(FailureReason::CaptionsDisabled);
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age_verification")
    {
        return Some(FailureReason::AgeRestricted);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geographic restriction")
    {
        return Some(FailureReason::GeoBlocked);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("captcha")
        || lower.contains("unusual traffic")
        || lower.contains("consent")
        || lower.contains("confirm you're not a robot")
        || lower.contains("automated")
    {
        return Some(FailureReason::BotChallenge);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(FailureReason::Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    if !detail.is_empty() {
        return Some(FailureReason::Unknown);
    }

    None
}
