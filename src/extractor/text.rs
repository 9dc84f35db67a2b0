// Caption text extraction - heuristic cascade over raw caption documents
//
// Caption assets come back in several undocumented shapes (timed XML, CDATA
// wrappers, attribute-carried text, loose markup). Four methods are tried in
// fixed cheap-to-expensive order; the first one producing a non-trivial match
// wins. Pure string processing, no I/O.

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::ExtractError;
use super::models::TextSegment;

lazy_static! {
    // Method 1: tagged text, three tag-shape variants
    static ref TAG_TIMED_RE: Regex = Regex::new(
        r#"(?s)<text\b[^>]*\bstart="([0-9.]+)"[^>]*\bdur="([0-9.]+)"[^>]*>(.*?)</text>"#
    )
    .unwrap();
    static ref TAG_SELF_CLOSING_RE: Regex =
        Regex::new(r#"<text\b[^>]*\btext="([^"]*)"[^>]*/>"#).unwrap();
    static ref TAG_BARE_RE: Regex = Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").unwrap();

    // Method 2: CDATA sections
    static ref CDATA_RE: Regex = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap();

    // Method 3: generic text-bearing attributes
    static ref ATTR_RE: Regex =
        Regex::new(r#"\b(?:text|content|caption|transcript)="([^"]+)""#).unwrap();

    // Method 4: any markup-delimited text run, last resort
    static ref MARKUP_RUN_RE: Regex = Regex::new(r">([^<>]+)<").unwrap();

    static ref STRIP_TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref ENTITY_RE: Regex = Regex::new(r"&(#[xX]?[0-9a-fA-F]+|[a-zA-Z]+);").unwrap();
}

/// Extracts ordered text segments from one raw caption document
#[derive(Debug, Clone)]
pub struct CaptionTextExtractor {
    /// Structural floor: total cleaned text below this is rejected outright
    min_total_chars: usize,
}

impl Default for CaptionTextExtractor {
    fn default() -> Self {
        Self { min_total_chars: 50 }
    }
}

impl CaptionTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(mut self, min_total_chars: usize) -> Self {
        self.min_total_chars = min_total_chars;
        self
    }

    /// Run the cascade and return cleaned segments in document order
    pub fn extract(&self, raw: &str) -> Result<Vec<TextSegment>, ExtractError> {
        let segments = self
            .tagged_text(raw)
            .or_else(|| self.cdata_sections(raw))
            .or_else(|| self.text_attributes(raw))
            .or_else(|| self.markup_runs(raw))
            .ok_or_else(|| {
                ExtractError::NoUsableText("no extraction method matched".to_string())
            })?;

        let total: usize = segments.iter().map(|s| s.text.chars().count()).sum();
        if total < self.min_total_chars {
            return Err(ExtractError::NoUsableText(format!(
                "only {} characters extracted (floor {})",
                total, self.min_total_chars
            )));
        }

        Ok(segments)
    }

    fn tagged_text(&self, raw: &str) -> Option<Vec<TextSegment>> {
        let timed: Vec<TextSegment> = TAG_TIMED_RE
            .captures_iter(raw)
            .filter_map(|caps| {
                let text = clean_text(&caps[3]);
                if text.is_empty() {
                    return None;
                }
                Some(TextSegment {
                    text,
                    start: caps[1].parse().ok(),
                    duration: caps[2].parse().ok(),
                })
            })
            .collect();
        if !timed.is_empty() {
            return Some(timed);
        }

        let self_closing = collect_untimed(TAG_SELF_CLOSING_RE.captures_iter(raw));
        if !self_closing.is_empty() {
            return Some(self_closing);
        }

        let bare = collect_untimed(TAG_BARE_RE.captures_iter(raw));
        if !bare.is_empty() {
            return Some(bare);
        }

        None
    }

    fn cdata_sections(&self, raw: &str) -> Option<Vec<TextSegment>> {
        let segments = collect_untimed(CDATA_RE.captures_iter(raw));
        (!segments.is_empty()).then_some(segments)
    }

    fn text_attributes(&self, raw: &str) -> Option<Vec<TextSegment>> {
        let segments = collect_untimed(ATTR_RE.captures_iter(raw));
        (!segments.is_empty()).then_some(segments)
    }

    fn markup_runs(&self, raw: &str) -> Option<Vec<TextSegment>> {
        let segments: Vec<TextSegment> = MARKUP_RUN_RE
            .captures_iter(raw)
            .filter_map(|caps| {
                let text = clean_text(&caps[1]);
                // Loose runs pick up markup noise; demand something word-like
                if text.chars().count() < 3 || !text.chars().any(|c| c.is_alphabetic()) {
                    return None;
                }
                Some(TextSegment::new(text))
            })
            .collect();
        (!segments.is_empty()).then_some(segments)
    }
}

fn collect_untimed<'a>(caps: impl Iterator<Item = regex::Captures<'a>>) -> Vec<TextSegment> {
    caps.filter_map(|c| {
        let text = clean_text(&c[1]);
        (!text.is_empty()).then(|| TextSegment::new(text))
    })
    .collect()
}

/// Decode entities, strip residual markup, drop control characters and
/// collapse whitespace
pub fn clean_text(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let stripped = STRIP_TAG_RE.replace_all(&decoded, " ");
    let no_control: String = stripped
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    WHITESPACE_RE.replace_all(&no_control, " ").trim().to_string()
}

fn decode_entities(raw: &str) -> String {
    ENTITY_RE
        .replace_all(raw, |caps: &regex::Captures| {
            let body = &caps[1];
            match body {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                _ => {
                    if let Some(rest) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X"))
                    {
                        u32::from_str_radix(rest, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .map(String::from)
                            .unwrap_or_else(|| caps[0].to_string())
                    } else if let Some(rest) = body.strip_prefix('#') {
                        rest.parse::<u32>()
                            .ok()
                            .and_then(char::from_u32)
                            .map(String::from)
                            .unwrap_or_else(|| caps[0].to_string())
                    } else {
                        // Unknown named entity, leave untouched
                        caps[0].to_string()
                    }
                }
            }
        })
        .into_owned()
}
