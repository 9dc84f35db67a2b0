// Last-resort strategy - delegate to the yt-dlp tool
//
// Slower than scraping and needs the binary installed, but yt-dlp keeps up
// with page changes faster than any in-crate pattern list can. The payload
// shapes it hands back vary by subtitle format, so normalization here is
// deliberately defensive.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{self, build_client, fetch_text};
use crate::extractor::models::{CaptionTrack, TextSegment};
use crate::extractor::text::{clean_text, CaptionTextExtractor};
use crate::extractor::tracks::select_track;
use crate::extractor::traits::{ExtractionStrategy, ExtractorConfig};

pub struct YtDlpStrategy {
    tool_path: String,
    extractor: CaptionTextExtractor,
}

impl YtDlpStrategy {
    pub fn new() -> Self {
        Self {
            tool_path: Self::find_tool(),
            extractor: CaptionTextExtractor::new(),
        }
    }

    /// Use a specific binary instead of probing common install paths
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            tool_path: path.into(),
            extractor: CaptionTextExtractor::new(),
        }
    }

    /// Find the yt-dlp binary
    fn find_tool() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Try to find via `which`
        if let Ok(output) = std::process::Command::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    fn is_available(&self) -> bool {
        match std::process::Command::new(&self.tool_path)
            .arg("--version")
            .output()
        {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    fn build_args(&self, video_id: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.asset_timeout_secs.to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if let Some(proxy) = &config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(fetch::watch_url(video_id, None));
        args
    }

    /// Run the tool and parse its JSON description of the video
    async fn dump_description(
        &self,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Value, ExtractError> {
        let args = self.build_args(video_id, config);
        debug!(tool = %self.tool_path, video_id, "running external tool");

        let child = TokioCommand::new(&self.tool_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractError::Tool(format!("failed to start {}: {}", self.tool_path, e)))?;

        // The tool does several fetches of its own; give it headroom beyond
        // one asset timeout.
        let budget = Duration::from_secs(config.asset_timeout_secs * 3);
        let output = tokio::time::timeout(budget, child.wait_with_output())
            .await
            .map_err(|_| {
                ExtractError::Tool(format!("yt-dlp timed out after {}s", budget.as_secs()))
            })?
            .map_err(|e| ExtractError::Tool(format!("failed to read yt-dlp output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Tool(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .map_err(|e| ExtractError::MalformedDocument(format!("yt-dlp JSON: {}", e)))
    }

    /// Caption tracks offered in the tool's description
    ///
    /// `subtitles` holds human-authored tracks, `automatic_captions` the
    /// machine-generated ones. Each maps language code to a list of format
    /// entries; json3 is preferred since its shape is the richest.
    fn subtitle_tracks(description: &Value) -> Vec<CaptionTrack> {
        let mut tracks = Vec::new();
        for (field, auto_generated) in [("subtitles", false), ("automatic_captions", true)] {
            let Some(map) = description.get(field).and_then(Value::as_object) else {
                continue;
            };
            for (language_code, entries) in map {
                let Some(entries) = entries.as_array() else {
                    continue;
                };
                let entry = entries
                    .iter()
                    .find(|e| e.get("ext").and_then(Value::as_str) == Some("json3"))
                    .or_else(|| entries.first());
                let Some(base_url) = entry
                    .and_then(|e| e.get("url"))
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                let display_name = entry
                    .and_then(|e| e.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or(language_code);
                tracks.push(CaptionTrack {
                    language_code: language_code.clone(),
                    auto_generated,
                    base_url: base_url.to_string(),
                    display_name: display_name.to_string(),
                });
            }
        }
        tracks
    }

    /// Normalize a parsed caption payload into cleaned segments
    ///
    /// Accepts an array of strings, an array of text-bearing objects (with
    /// optional timing), or a wrapper object whose first array-valued property
    /// yields text. Returns None when nothing text-like is found.
    fn segments_from_payload(payload: &Value) -> Option<Vec<TextSegment>> {
        match payload {
            Value::Array(items) => {
                let segments: Vec<TextSegment> =
                    items.iter().filter_map(segment_from_element).collect();
                (!segments.is_empty()).then_some(segments)
            }
            Value::Object(map) => {
                let known = ["events", "segments", "captions", "items", "lines"];
                let candidates = known
                    .iter()
                    .filter_map(|k| map.get(*k))
                    .chain(map.values())
                    .filter(|v| v.is_array());
                for value in candidates {
                    if let Some(segments) = Self::segments_from_payload(value) {
                        return Some(segments);
                    }
                }
                None
            }
            _ => None,
        }
    }
}

/// One segment from one payload element, if it carries text
fn segment_from_element(item: &Value) -> Option<TextSegment> {
    let raw = match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let direct = ["text", "content", "caption", "transcript", "utf8"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str).map(str::to_string));
            match direct {
                Some(text) => text,
                // json3 events nest text one level down in `segs`
                None => {
                    let segs = map.get("segs")?.as_array()?;
                    segs.iter()
                        .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join("")
                }
            }
        }
        _ => return None,
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return None;
    }

    let (start, duration) = match item {
        Value::Object(map) => (
            map.get("start")
                .and_then(Value::as_f64)
                .or_else(|| map.get("tStartMs").and_then(Value::as_f64).map(|ms| ms / 1000.0)),
            map.get("duration")
                .and_then(Value::as_f64)
                .or_else(|| map.get("dDurationMs").and_then(Value::as_f64).map(|ms| ms / 1000.0)),
        ),
        _ => (None, None),
    };

    Some(TextSegment {
        text,
        start,
        duration,
    })
}

impl Default for YtDlpStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for YtDlpStrategy {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn attempt(
        &self,
        video_id: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<TextSegment>, ExtractError> {
        if !self.is_available() {
            return Err(ExtractError::Tool("yt-dlp binary not found".to_string()));
        }

        let description = self.dump_description(video_id, config).await?;
        let tracks = Self::subtitle_tracks(&description);
        let track =
            select_track(&tracks, config.language.as_deref()).ok_or(ExtractError::NoCaptionTracks)?;
        debug!(
            video_id,
            language = %track.language_code,
            auto = track.auto_generated,
            "selected caption track from tool output"
        );

        let client = build_client(&fetch::DESKTOP, config, config.asset_timeout_secs)?;
        let raw = fetch_text(&client, &track.base_url, &fetch::DESKTOP).await?;

        // JSON payloads get structural normalization; anything else goes
        // through the markup cascade.
        if let Ok(payload) = serde_json::from_str::<Value>(&raw) {
            if let Some(segments) = Self::segments_from_payload(&payload) {
                return Ok(segments);
            }
            return Err(ExtractError::NoUsableText(
                "tool payload carried no text".to_string(),
            ));
        }
        self.extractor.extract(&raw)
    }
}
