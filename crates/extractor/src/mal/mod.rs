//! MyAnimeList site plugin.
//!
//! URL canonicalization plus the three page parsers (entry, related,
//! recommendations). The parsers are regex-driven over whitespace
//! normalized page text and degrade gracefully: a missing field falls
//! back to a documented default, only a missing title discards the page.

pub mod entry;
pub mod recommendations;
pub mod related;

use crate::registry::SitePlugin;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{AnimeRecord, InfoLink};
use std::collections::{HashMap, HashSet};
use url::Url;

const HOST: &str = "myanimelist.net";

/// Canonical entry URL shape; the id is the longest digit run after the
/// `/anime/` segment.
static ANIME_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?myanimelist\.net/anime/(\d+)").expect("valid regex")
});

/// The MyAnimeList plugin.
pub struct MalPlugin;

impl SitePlugin for MalPlugin {
    fn name(&self) -> &'static str {
        HOST
    }

    fn is_responsible(&self, raw_url: &str) -> bool {
        let Ok(url) = Url::parse(raw_url.trim()) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        matches!(url.host_str(), Some(host) if host == HOST || host == format!("www.{HOST}"))
    }

    fn normalize(&self, raw_url: &str) -> InfoLink {
        normalize_url(raw_url)
    }

    fn extract_entry(&self, link: &InfoLink, content: &str) -> Option<AnimeRecord> {
        entry::extract(link, content)
    }

    fn extract_related(&self, content: &str) -> HashSet<InfoLink> {
        related::extract_related(content)
    }

    fn extract_recommendations(&self, content: &str) -> HashMap<InfoLink, u32> {
        recommendations::extract_recommendations(content)
    }

    fn recommendations_url(&self, link: &InfoLink) -> InfoLink {
        match ANIME_URL_RE.captures(link.as_str()) {
            Some(caps) => InfoLink::new(format!("https://{}/anime/{}/_/userrecs", HOST, &caps[1])),
            None => link.clone(),
        }
    }
}

/// Canonicalize a raw MyAnimeList URL.
///
/// Strips everything after the numeric identifier segment and rewrites
/// the scheme and host to `https://myanimelist.net`. Input that does not
/// match the `…/anime/<digits>` shape is returned verbatim (trimmed);
/// blank input yields an invalid link. Idempotent.
pub fn normalize_url(raw_url: &str) -> InfoLink {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return InfoLink::invalid();
    }
    match ANIME_URL_RE.captures(trimmed) {
        Some(caps) => InfoLink::new(format!("https://{}/anime/{}", HOST, &caps[1])),
        None => InfoLink::new(trimmed),
    }
}

/// Collapse line breaks and tabs to nothing and runs of spaces to one
/// space, so the field regexes see a single-line page.
pub(crate) fn normalize_whitespace(content: &str) -> String {
    let flattened: String = content
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut out = String::with_capacity(flattened.len());
    let mut last_was_space = false;
    for c in flattened.chars() {
        if c == ' ' {
            if !last_was_space {
                out.push(c);
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

/// Minimal HTML entity decoding for extracted titles.
pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_responsible_accepts_both_schemes_and_www() {
        let plugin = MalPlugin;
        assert!(plugin.is_responsible("https://myanimelist.net/anime/1535"));
        assert!(plugin.is_responsible("http://myanimelist.net/anime/1535"));
        assert!(plugin.is_responsible("https://www.myanimelist.net/anime/1535"));
        assert!(plugin.is_responsible("http://www.myanimelist.net/anime/1535"));
    }

    #[test]
    fn test_is_responsible_rejects_foreign_hosts() {
        let plugin = MalPlugin;
        assert!(!plugin.is_responsible("https://example.org/anime/1535"));
        assert!(!plugin.is_responsible("https://notmyanimelist.net/anime/1535"));
        assert!(!plugin.is_responsible("ftp://myanimelist.net/anime/1535"));
        assert!(!plugin.is_responsible(""));
        assert!(!plugin.is_responsible("no url at all"));
    }

    #[test]
    fn test_normalize_strips_trailing_segments_and_query() {
        let link = normalize_url("http://myanimelist.net/anime/1535/Some_Title?query=x");
        assert_eq!(link.as_str(), "https://myanimelist.net/anime/1535");
    }

    #[test]
    fn test_normalize_rewrites_scheme_and_www() {
        let link = normalize_url("http://www.myanimelist.net/anime/918/Gintama");
        assert_eq!(link.as_str(), "https://myanimelist.net/anime/918");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_url("http://myanimelist.net/anime/1535/Some_Title");
        let twice = normalize_url(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_leaves_unexpected_shapes_verbatim() {
        let link = normalize_url("  https://myanimelist.net/profile/someone  ");
        assert_eq!(link.as_str(), "https://myanimelist.net/profile/someone");
    }

    #[test]
    fn test_normalize_blank_is_invalid() {
        assert!(!normalize_url("").is_valid());
        assert!(!normalize_url("   ").is_valid());
    }

    #[test]
    fn test_recommendations_url() {
        let plugin = MalPlugin;
        let link = InfoLink::new("https://myanimelist.net/anime/1535");
        assert_eq!(
            plugin.recommendations_url(&link).as_str(),
            "https://myanimelist.net/anime/1535/_/userrecs"
        );

        // Unexpected shapes are passed through unchanged.
        let odd = InfoLink::new("https://myanimelist.net/profile/someone");
        assert_eq!(plugin.recommendations_url(&odd), odd);
    }

    #[test]
    fn test_normalize_whitespace() {
        let text = "a\n\tb   c\r\nd  e";
        assert_eq!(normalize_whitespace(text), "ab cd e");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Fate&#039;s &amp; &quot;Fate&quot;"), "Fate's & \"Fate\"");
    }
}
