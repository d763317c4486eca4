//! Plugin registry mapping raw URLs to their responsible site plugin.

use anyhow::{bail, Result};
use shared::{AnimeRecord, InfoLink};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Capability set of one supported source site.
///
/// One implementation per source domain, registered into the
/// [`ExtractorRegistry`] at startup. All extraction methods are pure with
/// respect to the passed content and safe to call concurrently.
pub trait SitePlugin: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// True iff this plugin owns the URL's domain (with or without a
    /// `www.` prefix, http or https).
    fn is_responsible(&self, raw_url: &str) -> bool;

    /// Canonicalize a raw URL into an info link. Input that does not
    /// match the expected shape is returned verbatim (trimmed); blank
    /// input yields an invalid link.
    fn normalize(&self, raw_url: &str) -> InfoLink;

    /// Parse the fetched page into an anime record, or `None` when the
    /// page is not usable.
    fn extract_entry(&self, link: &InfoLink, content: &str) -> Option<AnimeRecord>;

    /// Collect the links of the page's related-anime section.
    fn extract_related(&self, content: &str) -> HashSet<InfoLink>;

    /// Parse the recommendations page into a link -> count map.
    fn extract_recommendations(&self, content: &str) -> HashMap<InfoLink, u32>;

    /// The secondary page holding the recommendations for an entry.
    fn recommendations_url(&self, link: &InfoLink) -> InfoLink;
}

/// Fixed, finite list of site plugins; first responsible plugin wins.
pub struct ExtractorRegistry {
    plugins: Vec<Arc<dyn SitePlugin>>,
}

impl ExtractorRegistry {
    /// Create a registry. Fails fast when no plugins are supplied.
    pub fn new(plugins: Vec<Arc<dyn SitePlugin>>) -> Result<Self> {
        if plugins.is_empty() {
            bail!("extractor registry requires at least one site plugin");
        }
        Ok(Self { plugins })
    }

    /// Find the plugin responsible for a raw URL.
    ///
    /// Plugins are checked in registration order and the first positive
    /// match wins; domains are treated as mutually exclusive.
    pub fn plugin_for(&self, raw_url: &str) -> Option<Arc<dyn SitePlugin>> {
        let plugin = self
            .plugins
            .iter()
            .find(|p| p.is_responsible(raw_url))
            .cloned();
        match &plugin {
            Some(p) => debug!(url = raw_url, plugin = p.name(), "Resolved site plugin"),
            None => debug!(url = raw_url, "No site plugin responsible for URL"),
        }
        plugin
    }
}
