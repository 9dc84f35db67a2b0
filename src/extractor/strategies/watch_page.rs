// Primary strategy - canonical watch-page scrape
//
// Fetch the desktop watch page, locate the embedded player configuration,
// pick the best caption track, fetch that asset and run the text cascade.

use async_trait::async_trait;
use tracing::debug;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{self, build_client, fetch_text};
use crate::extractor::models::TextSegment;
use crate::extractor::player::{list_caption_tracks, locate_player_config};
use crate::extractor::text::CaptionTextExtractor;
use crate::extractor::tracks::select_track;
use crate::extractor::traits::{ExtractionStrategy, ExtractorConfig};

pub struct WatchPageStrategy {
    extractor: CaptionTextExtractor,
}

impl WatchPageStrategy {
    pub fn new() -> Self {
        Self {
            extractor: CaptionTextExtractor::new(),
        }
    }
}

impl Default for WatchPageStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for WatchPageStrategy {
    fn name(&self) -> &'static str {
        "watch-page"
    }

    fn priority(&self) -> u8 {
        0
    }

    async fn attempt(
        &self,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<TextSegment>, ExtractError> {
        let profile = &fetch::DESKTOP;
        let page_client = build_client(profile, config, config.page_timeout_secs)?;
        let url = fetch::watch_url(video_id, config.language.as_deref());
        let page = fetch_text(&page_client, &url, profile).await?;

        let player = locate_player_config(&page)?;
        let tracks = list_caption_tracks(&player)?;
        let track =
            select_track(&tracks, config.language.as_deref()).ok_or(ExtractError::NoCaptionTracks)?;
        debug!(
            video_id,
            language = %track.language_code,
            auto = track.auto_generated,
            "selected caption track"
        );

        let asset_client = build_client(profile, config, config.asset_timeout_secs)?;
        let document = fetch_text(&asset_client, &track.base_url, profile).await?;
        self.extractor.extract(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_first() {
        let strategy = WatchPageStrategy::new();
        assert_eq!(strategy.name(), "watch-page");
        assert_eq!(strategy.priority(), 0);
    }
}
