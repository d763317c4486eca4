//! Data models for the anime catalogue.
//!
//! This module defines the value types shared between the extraction
//! pipeline and the cross-list store: canonical info links, anime records
//! produced by extraction, and the per-list entry shapes.

use serde::{Deserialize, Serialize};
use url::Url;

/// Sentinel picture URL used when a page carries no artwork.
pub const NO_PICTURE: &str = "https://cdn.myanimelist.net/images/qm_50.gif";

/// Sentinel thumbnail URL used when a page carries no artwork.
pub const NO_PICTURE_THUMBNAIL: &str = "https://cdn.myanimelist.net/images/qm_50t.gif";

/// Canonical identifier for a remote catalogue entry.
///
/// Wraps a trimmed URL string. Equality and hashing are by the canonical
/// string form, which makes `InfoLink` the dedup key across all lists.
/// Never mutated after construction; malformed input is represented as an
/// invalid link rather than an error, so callers always have a value to
/// pass around and log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoLink(String);

impl InfoLink {
    /// Wrap a raw URL string, trimming surrounding whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// The explicit "invalid" marker, used where the source had no link.
    pub fn invalid() -> Self {
        Self(String::new())
    }

    /// True iff the wrapped string parses as an absolute http(s) URL.
    pub fn is_valid(&self) -> bool {
        match Url::parse(&self.0) {
            Ok(url) => matches!(url.scheme(), "http" | "https"),
            Err(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InfoLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InfoLink {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Broadcast format of an anime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimeType {
    #[default]
    Tv,
    Movie,
    Ova,
    Special,
    Ona,
    Music,
}

impl AnimeType {
    /// Case-insensitive match against the six known labels.
    ///
    /// Returns `None` for anything unknown; the extractor decides the
    /// fallback, not the model.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "tv" => Some(AnimeType::Tv),
            "movie" => Some(AnimeType::Movie),
            "ova" => Some(AnimeType::Ova),
            "special" => Some(AnimeType::Special),
            "ona" => Some(AnimeType::Ona),
            "music" => Some(AnimeType::Music),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimeType::Tv => write!(f, "TV"),
            AnimeType::Movie => write!(f, "Movie"),
            AnimeType::Ova => write!(f, "OVA"),
            AnimeType::Special => write!(f, "Special"),
            AnimeType::Ona => write!(f, "ONA"),
            AnimeType::Music => write!(f, "Music"),
        }
    }
}

/// A fully extracted anime, produced by a successful page extraction.
///
/// Immutable once built; list-specific decorations (tracked id, location)
/// live on the list entry shapes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub title: String,
    pub anime_type: AnimeType,
    /// Episode count; 0 means unknown or ongoing.
    pub episodes: u32,
    pub info_link: InfoLink,
    pub picture: String,
    pub thumbnail: String,
    /// Links to related titles, insertion-ordered, no duplicates.
    related_links: Vec<InfoLink>,
}

impl AnimeRecord {
    pub fn new(title: impl Into<String>, info_link: InfoLink) -> Self {
        Self {
            title: title.into(),
            anime_type: AnimeType::default(),
            episodes: 0,
            info_link,
            picture: NO_PICTURE.to_string(),
            thumbnail: NO_PICTURE_THUMBNAIL.to_string(),
            related_links: Vec::new(),
        }
    }

    /// A record is usable iff it has a title and a valid info link.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.info_link.is_valid()
    }

    /// Append a related link, preserving insertion order and skipping
    /// duplicates.
    pub fn add_related_link(&mut self, link: InfoLink) {
        if !self.related_links.contains(&link) {
            self.related_links.push(link);
        }
    }

    pub fn related_links(&self) -> &[InfoLink] {
        &self.related_links
    }
}

/// Entry in the tracked list: the user's primary catalogue.
///
/// Identity is a store-assigned id rather than the info link, because a
/// local catalogue item may precede or outlive any remote link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    /// Unique id; 0 means "not yet assigned by the store".
    pub id: u64,
    pub title: String,
    pub anime_type: AnimeType,
    pub episodes: u32,
    /// Local filesystem tag, opaque to the core.
    pub location: String,
    pub thumbnail: String,
    pub info_link: InfoLink,
}

impl TrackedEntry {
    pub fn from_record(record: &AnimeRecord, location: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: record.title.clone(),
            anime_type: record.anime_type,
            episodes: record.episodes,
            location: location.into(),
            thumbnail: record.thumbnail.clone(),
            info_link: record.info_link.clone(),
        }
    }
}

/// Entry in the watch list: a title the user intends to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub title: String,
    pub thumbnail: String,
    pub info_link: InfoLink,
}

impl WatchEntry {
    pub fn new(title: impl Into<String>, thumbnail: impl Into<String>, info_link: InfoLink) -> Self {
        Self {
            title: title.into(),
            thumbnail: thumbnail.into(),
            info_link,
        }
    }
}

/// Entry in the filter list: a title the user explicitly excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub title: String,
    pub thumbnail: String,
    pub info_link: InfoLink,
}

impl FilterEntry {
    pub fn new(title: impl Into<String>, thumbnail: impl Into<String>, info_link: InfoLink) -> Self {
        Self {
            title: title.into(),
            thumbnail: thumbnail.into(),
            info_link,
        }
    }
}

// Promotions between list shapes copy title/thumbnail/info link only;
// type and episodes do not exist on the minimal shapes.

impl From<&FilterEntry> for WatchEntry {
    fn from(entry: &FilterEntry) -> Self {
        WatchEntry::new(entry.title.clone(), entry.thumbnail.clone(), entry.info_link.clone())
    }
}

impl From<&WatchEntry> for FilterEntry {
    fn from(entry: &WatchEntry) -> Self {
        FilterEntry::new(entry.title.clone(), entry.thumbnail.clone(), entry.info_link.clone())
    }
}

impl From<&AnimeRecord> for WatchEntry {
    fn from(record: &AnimeRecord) -> Self {
        WatchEntry::new(record.title.clone(), record.thumbnail.clone(), record.info_link.clone())
    }
}

impl From<&AnimeRecord> for FilterEntry {
    fn from(record: &AnimeRecord) -> Self {
        FilterEntry::new(record.title.clone(), record.thumbnail.clone(), record.info_link.clone())
    }
}
