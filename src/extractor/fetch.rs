// HTTP helpers shared by the page-scrape strategies
//
// Each strategy builds its own client so fingerprint, proxy and timeout
// differences never leak between attempts.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::errors::ExtractError;
use super::traits::ExtractorConfig;

/// One request fingerprint: UA plus language header
#[derive(Debug, Clone, Copy)]
pub struct ClientProfile {
    pub name: &'static str,
    pub user_agent: &'static str,
    pub accept_language: &'static str,
}

/// Desktop Chrome, the default fingerprint for the canonical watch page
pub const DESKTOP: ClientProfile = ClientProfile {
    name: "desktop",
    user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    accept_language: "en-US,en;q=0.9",
};

/// Android app fingerprint, less likely to hit the bot wall
pub const ANDROID: ClientProfile = ClientProfile {
    name: "android",
    user_agent: "com.google.android.youtube/19.09.37 (Linux; U; Android 14) gzip",
    accept_language: "en-US,en;q=0.9",
};

/// Mobile Safari, for the m. page variant
pub const MOBILE: ClientProfile = ClientProfile {
    name: "mobile",
    user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    accept_language: "en-US,en;q=0.9",
};

/// Build a client for one profile, honoring proxy and timeout from config
pub fn build_client(
    profile: &ClientProfile,
    config: &ExtractorConfig,
    timeout_secs: u64,
) -> Result<Client, ExtractError> {
    let mut builder = Client::builder()
        .user_agent(profile.user_agent)
        .timeout(Duration::from_secs(timeout_secs));

    if let Some(proxy_url) = config.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// GET a URL and return the body, mapping non-2xx to `ExtractError::Status`
pub async fn fetch_text(
    client: &Client,
    url: &str,
    profile: &ClientProfile,
) -> Result<String, ExtractError> {
    debug!(url, profile = profile.name, "fetching");

    let response = client
        .get(url)
        .header("Accept-Language", profile.accept_language)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    debug!(url, bytes = body.len(), "fetched");
    Ok(body)
}

/// Watch-page URL for the canonical desktop host
pub fn watch_url(video_id: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!("https://www.youtube.com/watch?v={}&hl={}", video_id, lang),
        None => format!("https://www.youtube.com/watch?v={}", video_id),
    }
}

/// Watch-page URL for the mobile host
pub fn mobile_watch_url(video_id: &str) -> String {
    format!("https://m.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url_carries_language() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ", Some("en")),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&hl=en"
        );
        assert_eq!(
            watch_url("dQw4w9WgXcQ", None),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_profiles_are_distinct_fingerprints() {
        assert_ne!(DESKTOP.user_agent, ANDROID.user_agent);
        assert_ne!(DESKTOP.user_agent, MOBILE.user_agent);
    }
}
