// Embedded player-configuration parsing
//
// Watch pages embed a large JSON document whose surrounding script text
// varies across page builds (var declaration, window assignment, minified
// whitespace). The document itself is untrusted: truncation and sloppy
// serialization are routine, so parsing is best-effort with bounded repair.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::errors::ExtractError;
use super::models::CaptionTrack;

lazy_static! {
    // Assignment-head variants in likelihood order
    static ref PLAYER_HEADS: Vec<Regex> = vec![
        Regex::new(r#"var\s+ytInitialPlayerResponse\s*=\s*\{"#).unwrap(),
        Regex::new(r#"window\s*\[\s*["']ytInitialPlayerResponse["']\s*\]\s*=\s*\{"#).unwrap(),
        Regex::new(r#"window\.ytInitialPlayerResponse\s*=\s*\{"#).unwrap(),
        Regex::new(r#"ytInitialPlayerResponse\s*=\s*\{"#).unwrap(),
    ];
    // Bare captions fragment, used by the variant strategy when no full
    // player document is present
    static ref CAPTIONS_FRAGMENT_HEAD: Regex =
        Regex::new(r#""captions"\s*:\s*\{"#).unwrap();
}

/// Locate and parse the embedded player configuration
pub fn locate_player_config(page: &str) -> Result<Value, ExtractError> {
    for head in PLAYER_HEADS.iter() {
        if let Some(found) = head.find(page) {
            let object = object_slice(&page[found.end() - 1..]);
            if let Some(value) = parse_with_repair(object) {
                return Ok(value);
            }
        }
    }
    Err(ExtractError::PlayerConfigMissing)
}

/// Locate a bare `"captions": {...}` fragment and parse just that object
pub fn locate_captions_fragment(page: &str) -> Result<Value, ExtractError> {
    let found = CAPTIONS_FRAGMENT_HEAD
        .find(page)
        .ok_or(ExtractError::PlayerConfigMissing)?;
    let object = object_slice(&page[found.end() - 1..]);
    parse_with_repair(object).ok_or_else(|| {
        ExtractError::MalformedDocument("captions fragment would not parse".to_string())
    })
}

/// Best-effort JSON decoding: verbatim, then comment/trailing-comma strip,
/// then brace balancing. Two repair passes at most, never more.
pub fn parse_with_repair(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }

    let stripped = strip_comments_and_trailing_commas(raw);
    if let Ok(value) = serde_json::from_str(&stripped) {
        return Some(value);
    }

    let balanced = balance_delimiters(&stripped);
    serde_json::from_str(&balanced).ok()
}

/// Slice from an opening brace to its matching close, string-aware
///
/// Returns the remainder when the document is truncated; repair appends the
/// missing closers afterwards.
fn object_slice(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &s[..=i];
                }
            }
            _ => {}
        }
    }
    s
}

/// Drop `//` and `/* */` comments and trailing commas outside strings
fn strip_comments_and_trailing_commas(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut i = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' => {
                in_string = true;
                out.push(b'"');
                i += 1;
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            b',' => {
                // Trailing comma: next non-whitespace closes the container
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j < bytes.len() && (bytes[j] == b'}' || bytes[j] == b']') {
                    i += 1; // drop the comma, keep the whitespace
                } else {
                    out.push(b',');
                    i += 1;
                }
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    // Only ASCII spans were removed, so the bytes are still valid UTF-8
    String::from_utf8_lossy(&out).into_owned()
}

/// Append the closers a truncated document is missing
fn balance_delimiters(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = raw.trim_end().to_string();
    if in_string {
        out.push('"');
    }
    if out.ends_with(',') {
        out.pop();
    }
    while let Some(closer) = stack.pop() {
        out.push(closer as char);
    }
    out
}

/// List the caption tracks a parsed player configuration offers
pub fn list_caption_tracks(config: &Value) -> Result<Vec<CaptionTrack>, ExtractError> {
    let tracks = config
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .or_else(|| config.pointer("/playerCaptionsTracklistRenderer/captionTracks"))
        .or_else(|| config.get("captionTracks"))
        .and_then(Value::as_array)
        .ok_or(ExtractError::NoCaptionTracks)?;

    let parsed: Vec<CaptionTrack> = tracks.iter().filter_map(parse_track).collect();
    if parsed.is_empty() {
        return Err(ExtractError::NoCaptionTracks);
    }
    Ok(parsed)
}

fn parse_track(raw: &Value) -> Option<CaptionTrack> {
    let base_url = raw.get("baseUrl").and_then(Value::as_str)?;
    let language_code = raw.get("languageCode").and_then(Value::as_str)?;
    let auto_generated = raw.get("kind").and_then(Value::as_str) == Some("asr");
    let display_name = raw
        .pointer("/name/simpleText")
        .or_else(|| raw.pointer("/name/runs/0/text"))
        .and_then(Value::as_str)
        .unwrap_or(language_code);

    Some(CaptionTrack {
        language_code: language_code.to_string(),
        auto_generated,
        base_url: base_url.to_string(),
        display_name: display_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(assignment: &str) -> String {
        format!(
            "<html><script>stuff();{}{}</script></html>",
            assignment,
            r#"{"videoDetails":{"videoId":"abc123"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://captions.example/en","languageCode":"en","name":{"simpleText":"English"}}]}}};var next=1;"#
        )
    }

    #[test]
    fn test_locates_var_declaration() {
        let page = page_with("var ytInitialPlayerResponse = ");
        let config = locate_player_config(&page).unwrap();
        assert_eq!(config["videoDetails"]["videoId"], "abc123");
    }

    #[test]
    fn test_locates_window_assignment() {
        let page = page_with(r#"window["ytInitialPlayerResponse"] = "#);
        let config = locate_player_config(&page).unwrap();
        assert_eq!(config["videoDetails"]["videoId"], "abc123");
    }

    #[test]
    fn test_locates_minified_assignment() {
        let page = page_with("ytInitialPlayerResponse=");
        let config = locate_player_config(&page).unwrap();
        assert_eq!(config["videoDetails"]["videoId"], "abc123");
    }

    #[test]
    fn test_missing_document() {
        let err = locate_player_config("<html>no script here</html>").unwrap_err();
        assert!(matches!(err, ExtractError::PlayerConfigMissing));
    }

    #[test]
    fn test_repairs_trailing_commas() {
        let raw = r#"{"a": [1, 2, 3,], "b": {"c": 1,},}"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["a"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_repairs_comments_without_touching_urls() {
        let raw = "{\"url\": \"https://captions.example/x\", // inline note\n\"n\": 1}";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["url"], "https://captions.example/x");
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_balances_truncated_document() {
        let raw = r#"{"a": {"b": [1, 2"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["a"]["b"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unrepairable_returns_none() {
        assert!(parse_with_repair("]]]not json at all{{{").is_none());
    }

    #[test]
    fn test_lists_caption_tracks() {
        let page = page_with("var ytInitialPlayerResponse = ");
        let config = locate_player_config(&page).unwrap();
        let tracks = list_caption_tracks(&config).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
        assert_eq!(tracks[0].display_name, "English");
        assert!(!tracks[0].auto_generated);
    }

    #[test]
    fn test_asr_kind_marks_auto_generated() {
        let raw = serde_json::json!({
            "captionTracks": [
                {"baseUrl": "https://captions.example/en-asr", "languageCode": "en", "kind": "asr"}
            ]
        });
        let tracks = list_caption_tracks(&raw).unwrap();
        assert!(tracks[0].auto_generated);
        assert_eq!(tracks[0].display_name, "en");
    }

    #[test]
    fn test_no_tracks_is_an_error() {
        let raw = serde_json::json!({"captions": {}});
        assert!(matches!(
            list_caption_tracks(&raw).unwrap_err(),
            ExtractError::NoCaptionTracks
        ));
    }

    #[test]
    fn test_captions_fragment() {
        let page = r#"stuff "captions": {"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://captions.example/de","languageCode":"de"}]}} trailing"#;
        let fragment = locate_captions_fragment(page).unwrap();
        let tracks = list_caption_tracks(&fragment).unwrap();
        assert_eq!(tracks[0].language_code, "de");
    }
}
