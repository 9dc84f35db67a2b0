// Secondary strategy - alternate page shapes and fingerprints
//
// Used when the canonical scrape finds no player document or gets blocked.
// Three sub-approaches run in sequence, each with its own page fetch:
// 1. bare "captions" fragment on the desktop page (document shape changed)
// 2. android client fingerprint (desktop fingerprint blocked)
// 3. mobile page variant (desktop host blocked)
// First success wins; the last error is reported when all three fail.

use async_trait::async_trait;
use tracing::debug;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{self, build_client, fetch_text, ClientProfile};
use crate::extractor::models::TextSegment;
use crate::extractor::player::{
    list_caption_tracks, locate_captions_fragment, locate_player_config,
};
use crate::extractor::text::CaptionTextExtractor;
use crate::extractor::tracks::select_track;
use crate::extractor::traits::{ExtractionStrategy, ExtractorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubApproach {
    CaptionsFragment,
    AndroidClient,
    MobilePage,
}

impl SubApproach {
    fn label(&self) -> &'static str {
        match self {
            Self::CaptionsFragment => "captions-fragment",
            Self::AndroidClient => "android-client",
            Self::MobilePage => "mobile-page",
        }
    }
}

const SUB_APPROACHES: [SubApproach; 3] = [
    SubApproach::CaptionsFragment,
    SubApproach::AndroidClient,
    SubApproach::MobilePage,
];

pub struct VariantPageStrategy {
    extractor: CaptionTextExtractor,
}

impl VariantPageStrategy {
    pub fn new() -> Self {
        Self {
            extractor: CaptionTextExtractor::new(),
        }
    }

    async fn try_sub_approach(
        &self,
        sub: SubApproach,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<TextSegment>, ExtractError> {
        let (profile, url): (&ClientProfile, String) = match sub {
            SubApproach::CaptionsFragment => (
                &fetch::DESKTOP,
                fetch::watch_url(video_id, config.language.as_deref()),
            ),
            SubApproach::AndroidClient => (
                &fetch::ANDROID,
                fetch::watch_url(video_id, config.language.as_deref()),
            ),
            SubApproach::MobilePage => (&fetch::MOBILE, fetch::mobile_watch_url(video_id)),
        };

        let page_client = build_client(profile, config, config.page_timeout_secs)?;
        let page = fetch_text(&page_client, &url, profile).await?;

        // The fragment sub-approach skips straight to the captions object;
        // the other two expect a full player document in the variant page.
        let document = match sub {
            SubApproach::CaptionsFragment => locate_captions_fragment(&page)?,
            _ => locate_player_config(&page)
                .or_else(|_| locate_captions_fragment(&page))?,
        };
        let tracks = list_caption_tracks(&document)?;
        let track =
            select_track(&tracks, config.language.as_deref()).ok_or(ExtractError::NoCaptionTracks)?;
        debug!(
            video_id,
            sub = sub.label(),
            language = %track.language_code,
            "selected caption track"
        );

        let asset_client = build_client(profile, config, config.asset_timeout_secs)?;
        let raw = fetch_text(&asset_client, &track.base_url, profile).await?;
        self.extractor.extract(&raw)
    }
}

impl Default for VariantPageStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for VariantPageStrategy {
    fn name(&self) -> &'static str {
        "variant-page"
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn attempt(
        &self,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<TextSegment>, ExtractError> {
        let mut last_error = ExtractError::PlayerConfigMissing;

        for sub in SUB_APPROACHES {
            debug!(video_id, sub = sub.label(), "trying sub-approach");
            match self.try_sub_approach(sub, video_id, config).await {
                Ok(segments) => {
                    debug!(video_id, sub = sub.label(), "sub-approach succeeded");
                    return Ok(segments);
                }
                Err(e) => {
                    debug!(video_id, sub = sub.label(), error = %e, "sub-approach failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
