//! Recommendation extraction: recommendations page -> link -> count map.
//!
//! Recommendation blocks are visually grouped but not individually
//! delimited in markup, so this is a single-pass cursor scanner rather
//! than one regex. Two states: idle, or a candidate link pending its
//! count. Every branch strictly advances the cursor, so the scan is
//! linear in the content length.

use super::{normalize_url, normalize_whitespace};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::InfoLink;
use std::collections::HashMap;

/// Start of an anime link inside the recommendations markup.
const LINK_PREFIX: &str = "/anime/";

/// End-of-block delimiter between recommendation groups.
const FRAME_DELIMITER: &str = r#"<div class="picSurround">"#;

/// The phrase counted per block, matched case-insensitively.
const PHRASE: &str = "recommended by";

static LINK_AT_CURSOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/anime/(\d+)").expect("valid regex"));

/// Extract the recommendation counts from a recommendations page.
///
/// A candidate is committed with the number of "Recommended by" phrases
/// found between its link and the next picture-frame delimiter; a block
/// without the phrase discards its candidate. When the same id appears in
/// two non-adjacent blocks the later count overwrites the earlier one.
/// Never fails; pages without recommendation markup yield an empty map.
pub fn extract_recommendations(content: &str) -> HashMap<InfoLink, u32> {
    let text = normalize_whitespace(content);
    let mut result = HashMap::new();
    let mut pending: Option<InfoLink> = None;
    let mut cursor = 0;

    while cursor < text.len() {
        let rest = &text[cursor..];

        if pending.is_none() && rest.starts_with(LINK_PREFIX) {
            match LINK_AT_CURSOR_RE.captures(rest) {
                Some(caps) => {
                    let id = &caps[1];
                    pending = Some(normalize_url(&format!("https://myanimelist.net/anime/{id}")));
                    cursor += caps.get(0).expect("whole match").as_str().len();
                }
                // Prefix without a numeric id, e.g. /anime/season: skip it.
                None => cursor += LINK_PREFIX.len(),
            }
        } else if let Some(candidate) = pending.take() {
            let (span, next_cursor) = match rest.find(FRAME_DELIMITER) {
                Some(pos) => (&rest[..pos], cursor + pos + FRAME_DELIMITER.len()),
                None => (rest, text.len()),
            };
            let count = count_phrase(span);
            if count > 0 {
                result.insert(candidate, count);
            }
            cursor = next_cursor;
        } else {
            cursor += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    result
}

fn count_phrase(span: &str) -> u32 {
    span.to_lowercase().matches(PHRASE).count() as u32
}
