// ExtractionStrategy trait and shared configuration

use async_trait::async_trait;

use super::errors::ExtractError;
use super::models::TextSegment;
use super::validator::ValidationConfig;

/// Configuration shared by every strategy in one extraction call
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Preferred caption language (e.g. "en"); None lets track ranking decide
    pub language: Option<String>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Timeout for the watch-page fetch in seconds
    pub page_timeout_secs: u64,
    /// Timeout for caption-asset fetches in seconds
    pub asset_timeout_secs: u64,
    /// Thresholds for the quality validator
    pub validation: ValidationConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language: None,
            proxy: None,
            page_timeout_secs: 30,
            asset_timeout_secs: 20,
            validation: ValidationConfig::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_page_timeout(mut self, seconds: u64) -> Self {
        self.page_timeout_secs = seconds;
        self
    }

    pub fn with_asset_timeout(mut self, seconds: u64) -> Self {
        self.asset_timeout_secs = seconds;
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }
}

/// One independently retryable extraction procedure
///
/// Strategies own their network calls and document-shape assumptions and hold
/// no shared mutable state, so concurrent extraction calls do not interfere.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Name of the strategy (for logging and attempt records)
    fn name(&self) -> &'static str;

    /// Ascending invocation order; lower runs first
    fn priority(&self) -> u8;

    /// Fetch and extract an unvalidated candidate for one video
    async fn attempt(
        &self,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<TextSegment>, ExtractError>;
}
