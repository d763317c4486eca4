//! Extraction pipeline orchestrator.
//!
//! Glues the pieces together for one URL: registry picks the plugin, the
//! plugin normalizes the URL, the fetcher downloads the page, the
//! extractors parse it, and the result lands in the cross-list store.
//! Also drives the bulk "refresh all tracked titles" pass.

use crate::fetcher::ContentFetcher;
use crate::registry::ExtractorRegistry;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use shared::{AnimeRecord, CrossListStore, FilterEntry, InfoLink, TrackedEntry, WatchEntry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Statistics for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub processed: usize,
    pub imported: usize,
    pub related_found: usize,
    pub errors: usize,
}

/// The fetch -> normalize -> parse -> store pipeline.
pub struct ExtractionPipeline {
    registry: ExtractorRegistry,
    fetcher: ContentFetcher,
    store: Arc<CrossListStore>,
    concurrent_fetches: usize,
}

impl ExtractionPipeline {
    pub fn new(
        registry: ExtractorRegistry,
        fetcher: ContentFetcher,
        store: Arc<CrossListStore>,
        concurrent_fetches: usize,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            concurrent_fetches: concurrent_fetches.max(1),
        }
    }

    pub fn store(&self) -> &Arc<CrossListStore> {
        &self.store
    }

    /// Run extraction for one raw URL.
    ///
    /// Returns `Ok(None)` when no plugin is responsible or the page yields
    /// no usable record; both are "nothing to import", not failures.
    pub async fn extract_record(&self, raw_url: &str) -> Result<Option<AnimeRecord>> {
        let Some(plugin) = self.registry.plugin_for(raw_url) else {
            warn!(url = raw_url, "No supported source for URL, skipping");
            return Ok(None);
        };

        let link = plugin.normalize(raw_url);
        let content = self
            .fetcher
            .fetch(&link)
            .await
            .with_context(|| format!("Failed to fetch {link}"))?;

        let Some(mut record) = plugin.extract_entry(&link, &content) else {
            info!(link = %link, "Page yielded no record");
            return Ok(None);
        };

        for related in plugin.extract_related(&content) {
            record.add_related_link(related);
        }

        debug!(
            link = %link,
            title = %record.title,
            related = record.related_links().len(),
            "Extracted record"
        );
        Ok(Some(record))
    }

    /// Extract a URL and add the result to the tracked list.
    pub async fn import_tracked(&self, raw_url: &str, location: &str) -> Result<bool> {
        match self.extract_record(raw_url).await? {
            Some(record) => Ok(self.store.add_tracked(TrackedEntry::from_record(&record, location))),
            None => Ok(false),
        }
    }

    /// Extract a URL and add the result to the watch list.
    pub async fn import_watch(&self, raw_url: &str) -> Result<bool> {
        match self.extract_record(raw_url).await? {
            Some(record) => Ok(self.store.add_to_watch(WatchEntry::from(&record))),
            None => Ok(false),
        }
    }

    /// Extract a URL and add the result to the filter list.
    pub async fn import_filter(&self, raw_url: &str) -> Result<bool> {
        match self.extract_record(raw_url).await? {
            Some(record) => Ok(self.store.add_to_filter(FilterEntry::from(&record))),
            None => Ok(false),
        }
    }

    /// Fetch and parse the recommendations page for one entry.
    pub async fn fetch_recommendations(&self, raw_url: &str) -> Result<HashMap<InfoLink, u32>> {
        let Some(plugin) = self.registry.plugin_for(raw_url) else {
            warn!(url = raw_url, "No supported source for URL, skipping");
            return Ok(HashMap::new());
        };

        let link = plugin.recommendations_url(&plugin.normalize(raw_url));
        let content = self
            .fetcher
            .fetch(&link)
            .await
            .with_context(|| format!("Failed to fetch {link}"))?;

        Ok(plugin.extract_recommendations(&content))
    }

    /// Re-extract metadata for every tracked entry, concurrently.
    ///
    /// Fetches run in parallel up to the configured limit; store writes
    /// happen only after each fetch completes, never under a fetch. A
    /// single bad page is logged and counted, it never aborts the batch.
    pub async fn refresh_tracked(&self) -> PipelineStats {
        let entries = self.store.fetch_tracked_list();
        info!(entries = entries.len(), "Refreshing tracked list metadata");

        let results = stream::iter(entries)
            .map(|entry| async move {
                let refreshed = self.extract_record(entry.info_link.as_str()).await;
                (entry, refreshed)
            })
            .buffer_unordered(self.concurrent_fetches)
            .collect::<Vec<_>>()
            .await;

        let mut stats = PipelineStats::default();
        for (mut entry, refreshed) in results {
            stats.processed += 1;
            match refreshed {
                Ok(Some(record)) => {
                    entry.title = record.title.clone();
                    entry.anime_type = record.anime_type;
                    entry.episodes = record.episodes;
                    entry.thumbnail = record.thumbnail.clone();
                    stats.related_found += record.related_links().len();
                    self.store.update_or_create_tracked(entry);
                    stats.imported += 1;
                }
                Ok(None) => {
                    info!(link = %entry.info_link, "No record during refresh, keeping old entry");
                }
                Err(e) => {
                    warn!(link = %entry.info_link, error = %e, "Failed to refresh entry");
                    stats.errors += 1;
                }
            }
        }

        info!(
            processed = stats.processed,
            refreshed = stats.imported,
            errors = stats.errors,
            "Tracked list refresh complete"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mal::MalPlugin;

    fn pipeline() -> ExtractionPipeline {
        let registry = ExtractorRegistry::new(vec![Arc::new(MalPlugin)]).unwrap();
        let fetcher = ContentFetcher::new("ua", "text/html", 1, 0, 0, 1).unwrap();
        ExtractionPipeline::new(registry, fetcher, Arc::new(CrossListStore::new()), 2)
    }

    #[tokio::test]
    async fn test_unsupported_url_is_nothing_to_import() {
        let pipeline = pipeline();
        let record = pipeline.extract_record("https://example.org/anime/1").await.unwrap();
        assert!(record.is_none());

        let recs = pipeline.fetch_recommendations("https://example.org/anime/1").await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_of_empty_store_is_a_no_op() {
        let pipeline = pipeline();
        let stats = pipeline.refresh_tracked().await;
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.errors, 0);
    }
}
