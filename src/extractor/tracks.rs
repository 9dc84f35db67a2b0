// Caption track selection - picks the best of several offered tracks
//
// Sources usually offer both human-authored and machine-generated tracks per
// language. Human captions are materially better, so they outrank auto tracks
// for every language variant. Exact language match beats prefix match beats
// source order.

use super::models::CaptionTrack;

/// Pick the best track for an optional language preference
///
/// Ranking: exact language match first, then case-insensitive prefix match,
/// manual before auto within each band, prefix ties broken by lexical
/// language-code order; the source's first track is the final fallback.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred: Option<&str>,
) -> Option<&'a CaptionTrack> {
    if tracks.is_empty() {
        return None;
    }

    let mut best: Option<(&CaptionTrack, (u8, u8, &str, usize))> = None;
    for (index, track) in tracks.iter().enumerate() {
        let key = rank(track, preferred, index);
        match &best {
            Some((_, current)) if key >= *current => {}
            _ => best = Some((track, key)),
        }
    }
    best.map(|(track, _)| track)
}

/// Lower ranks first: (match band, authorship, language code, source order)
fn rank<'a>(
    track: &'a CaptionTrack,
    preferred: Option<&str>,
    index: usize,
) -> (u8, u8, &'a str, usize) {
    let band = match preferred {
        Some(want) => {
            let have = track.language_code.as_str();
            if have.eq_ignore_ascii_case(want) {
                0
            } else if is_prefix_match(have, want) {
                1
            } else {
                2
            }
        }
        // No preference: every track sits in one band and manual/lexical decide
        None => 1,
    };
    if band == 2 {
        // Nothing matched the request; fall back to source order alone
        return (2, 0, "", index);
    }
    let authorship = if track.auto_generated { 1 } else { 0 };
    (band, authorship, track.language_code.as_str(), index)
}

fn is_prefix_match(have: &str, want: &str) -> bool {
    let have = have.to_ascii_lowercase();
    let want = want.to_ascii_lowercase();
    have.starts_with(&want) || want.starts_with(&have)
}
