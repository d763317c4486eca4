//! Entry extraction: fetched page text -> [`AnimeRecord`].
//!
//! Each field is extracted independently with its own pattern and its own
//! fallback. Only a missing title discards the page; everything else
//! degrades to a default and is logged at low severity.

use super::{decode_entities, normalize_whitespace};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{AnimeRecord, AnimeType, InfoLink};
use tracing::debug;

/// Marker substrings of dead or blocked pages. Their presence means "no
/// record here", not a parse error.
const DEAD_PAGE_MARKERS: [&str; 2] = ["This page doesn't exist", "404 Not Found"];

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<meta property="og:title" content="([^"]+)""#).expect("valid regex")
});

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Type:</span> ?(?:<a [^>]*>)?([A-Za-z]+)").expect("valid regex")
});

static EPISODES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Episodes:</span> ?(\d+)").expect("valid regex"));

static PICTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https://cdn\.myanimelist\.net/images/anime/\d+/\d+\.[a-z]{3,4})")
        .expect("valid regex")
});

/// Extract an anime record from a fetched entry page.
///
/// Returns `None` for blank input, dead pages and pages without a title.
/// Pure: no side effects beyond the returned value.
pub fn extract(link: &InfoLink, content: &str) -> Option<AnimeRecord> {
    if link.as_str().is_empty() || content.trim().is_empty() {
        return None;
    }

    let text = normalize_whitespace(content);

    if DEAD_PAGE_MARKERS.iter().any(|marker| text.contains(marker)) {
        debug!(link = %link, "Page carries a dead-page marker, no record");
        return None;
    }

    let title = match TITLE_RE.captures(&text) {
        Some(caps) => decode_entities(caps[1].trim()),
        None => {
            debug!(link = %link, "No title found, discarding page");
            return None;
        }
    };
    if title.trim().is_empty() {
        return None;
    }

    let mut record = AnimeRecord::new(title, link.clone());

    record.anime_type = match TYPE_RE.captures(&text).and_then(|caps| AnimeType::from_label(&caps[1])) {
        Some(anime_type) => anime_type,
        None => {
            debug!(link = %link, "Type missing or unknown, falling back to TV");
            AnimeType::Tv
        }
    };

    // Missing or unparsable episode data never blocks record creation; it
    // only degrades to the "unknown" value of 0.
    record.episodes = match EPISODES_RE.captures(&text) {
        Some(caps) => caps[1].parse().unwrap_or_else(|_| {
            debug!(link = %link, "Episode count not numeric, storing 0");
            0
        }),
        None => {
            debug!(link = %link, "Episode count missing, storing 0");
            0
        }
    };

    if let Some(caps) = PICTURE_RE.captures(&text) {
        record.picture = caps[1].to_string();
        record.thumbnail = derive_thumbnail(&record.picture);
    } else {
        debug!(link = %link, "No picture found, keeping no-image sentinels");
    }

    Some(record)
}

/// The thumbnail is not fetched independently; it is the picture URL with
/// a `t` marker inserted before the file extension.
fn derive_thumbnail(picture: &str) -> String {
    match picture.rfind('.') {
        Some(dot) => format!("{}t{}", &picture[..dot], &picture[dot..]),
        None => picture.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{NO_PICTURE, NO_PICTURE_THUMBNAIL};

    fn link() -> InfoLink {
        InfoLink::new("https://myanimelist.net/anime/1535")
    }

    fn page(title: &str, type_label: &str, episodes: &str) -> String {
        format!(
            r#"<html><head>
            <meta property="og:title" content="{title}">
            </head><body>
            <img src="https://cdn.myanimelist.net/images/anime/9/9453.jpg">
            <span class="dark_text">Type:</span>
            <a href="https://myanimelist.net/topanime.php?type=tv">{type_label}</a>
            <div><span class="dark_text">Episodes:</span>
            {episodes}</div>
            </body></html>"#
        )
    }

    #[test]
    fn test_extract_full_record() {
        let record = extract(&link(), &page("Death Note", "TV", "37")).unwrap();
        assert_eq!(record.title, "Death Note");
        assert_eq!(record.anime_type, AnimeType::Tv);
        assert_eq!(record.episodes, 37);
        assert_eq!(record.picture, "https://cdn.myanimelist.net/images/anime/9/9453.jpg");
        assert_eq!(record.thumbnail, "https://cdn.myanimelist.net/images/anime/9/9453t.jpg");
        assert_eq!(record.info_link, link());
    }

    #[test]
    fn test_blank_input_yields_no_record() {
        assert!(extract(&InfoLink::invalid(), "<html></html>").is_none());
        assert!(extract(&link(), "").is_none());
        assert!(extract(&link(), "   \n\t ").is_none());
    }

    #[test]
    fn test_dead_page_markers_yield_no_record() {
        for marker in DEAD_PAGE_MARKERS {
            let content = page("Death Note", "TV", "37") + marker;
            assert!(extract(&link(), &content).is_none());
        }
    }

    #[test]
    fn test_missing_title_discards_page() {
        let content = r#"<span class="dark_text">Type:</span> TV"#;
        assert!(extract(&link(), content).is_none());
    }

    #[test]
    fn test_title_entities_are_decoded() {
        let record = extract(&link(), &page("Fate&#039;s Call &amp; Answer", "TV", "12")).unwrap();
        assert_eq!(record.title, "Fate's Call & Answer");
    }

    #[test]
    fn test_known_types_match_case_insensitively() {
        for (label, expected) in [
            ("TV", AnimeType::Tv),
            ("movie", AnimeType::Movie),
            ("OVA", AnimeType::Ova),
            ("special", AnimeType::Special),
            ("ONA", AnimeType::Ona),
            ("music", AnimeType::Music),
        ] {
            let record = extract(&link(), &page("Some Title", label, "1")).unwrap();
            assert_eq!(record.anime_type, expected, "label {label}");
        }
    }

    #[test]
    fn test_unknown_or_missing_type_defaults_to_tv() {
        let record = extract(&link(), &page("Some Title", "Doujin", "1")).unwrap();
        assert_eq!(record.anime_type, AnimeType::Tv);

        let no_type_field = r#"<meta property="og:title" content="Some Title">"#;
        let record = extract(&link(), no_type_field).unwrap();
        assert_eq!(record.anime_type, AnimeType::Tv);
    }

    #[test]
    fn test_missing_episodes_degrade_to_zero() {
        let record = extract(&link(), &page("Some Title", "TV", "Unknown")).unwrap();
        assert_eq!(record.episodes, 0);

        let no_episodes = r#"<meta property="og:title" content="Some Title">"#;
        let record = extract(&link(), no_episodes).unwrap();
        assert_eq!(record.episodes, 0);
    }

    #[test]
    fn test_missing_picture_keeps_sentinels() {
        let content = r#"<meta property="og:title" content="Some Title">"#;
        let record = extract(&link(), content).unwrap();
        assert_eq!(record.picture, NO_PICTURE);
        assert_eq!(record.thumbnail, NO_PICTURE_THUMBNAIL);
    }

    #[test]
    fn test_fields_survive_line_breaks_and_tabs() {
        let content = "<meta property=\"og:title\" content=\"Some Title\">\n\
                       <span class=\"dark_text\">Type:</span>\n\t<a href=\"x\">OVA</a>\n\
                       <span class=\"dark_text\">Episodes:</span>\n26";
        let record = extract(&link(), content).unwrap();
        assert_eq!(record.anime_type, AnimeType::Ova);
        assert_eq!(record.episodes, 26);
    }

    #[test]
    fn test_derive_thumbnail() {
        assert_eq!(
            derive_thumbnail("https://cdn.myanimelist.net/images/anime/9/9453.jpg"),
            "https://cdn.myanimelist.net/images/anime/9/9453t.jpg"
        );
    }
}
