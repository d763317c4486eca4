//! Related-anime extraction: page text -> set of info links.

use super::normalize_url;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::InfoLink;
use std::collections::HashSet;

/// Section heading, with all whitespace already stripped.
const SECTION_START: &str = "RelatedAnime";

/// Boundaries ending the related-anime block.
const SECTION_END: [&str; 2] = ["</table>", "<h2"];

static RELATED_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/anime/(\d+)").expect("valid regex"));

/// Collect all related-anime links from an entry page.
///
/// Never fails: pages without a "Related Anime" section, or with the
/// degenerate "no related anime" markup, yield an empty set. Matches are
/// canonicalized through the site normalizer, and set semantics guarantee
/// no duplicates even when the page lists a title twice.
pub fn extract_related(content: &str) -> HashSet<InfoLink> {
    let text: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    let Some(start) = text.find(SECTION_START) else {
        return HashSet::new();
    };
    let block = &text[start + SECTION_START.len()..];
    let end = SECTION_END
        .iter()
        .filter_map(|marker| block.find(marker))
        .min()
        .unwrap_or(block.len());
    let block = &block[..end];

    RELATED_ID_RE
        .captures_iter(block)
        .map(|caps| normalize_url(&format!("https://myanimelist.net/anime/{}", &caps[1])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <h2>Information</h2>
        <a href="/anime/999/Unrelated">elsewhere on the page</a>
        <h2>Related Anime</h2>
        <table>
          <td><a href="/anime/2994/Gintama_Jump_Festa_2005">Gintama: Jump Festa 2005</a></td>
          <td><a href="https://myanimelist.net/anime/9969/Gintama">Gintama'</a></td>
          <td><a href="/anime/2994/Gintama_Jump_Festa_2005">listed twice</a></td>
        </table>
        <h2>Characters</h2>
        <a href="/anime/1/After_Section">not related</a>
    "#;

    #[test]
    fn test_extracts_links_inside_section_only() {
        let related = extract_related(PAGE);
        assert_eq!(related.len(), 2);
        assert!(related.contains(&InfoLink::new("https://myanimelist.net/anime/2994")));
        assert!(related.contains(&InfoLink::new("https://myanimelist.net/anime/9969")));
        assert!(!related.contains(&InfoLink::new("https://myanimelist.net/anime/999")));
        assert!(!related.contains(&InfoLink::new("https://myanimelist.net/anime/1")));
    }

    #[test]
    fn test_no_section_yields_empty_set() {
        assert!(extract_related("<html><body>nothing here</body></html>").is_empty());
        assert!(extract_related("").is_empty());
    }

    #[test]
    fn test_degenerate_section_yields_empty_set() {
        let page = "<h2>Related Anime</h2>No related anime<h2>Characters</h2>";
        assert!(extract_related(page).is_empty());
    }
}
