//! Cross-list store for the three catalogue lists.
//!
//! Holds the tracked, watch and filter lists in memory behind per-list
//! locks and enforces the membership invariants: an info link is a key in
//! at most one of {watch, filter} at a time, a tracked entry sharing a
//! link evicts it from both, and no list ever holds two entries with the
//! same link.

use crate::models::{FilterEntry, InfoLink, TrackedEntry, WatchEntry, NO_PICTURE_THUMBNAIL};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;
use tracing::debug;

/// Concurrency-safe store of the three mutually exclusive lists.
///
/// Watch and filter entries are keyed by the canonical info link string;
/// tracked entries are keyed by a store-assigned id. Methods that touch
/// more than one list take the per-list write locks in a fixed order
/// (tracked, watch, filter) inside a single critical section, so eviction
/// sequences are atomic from a reader's point of view.
#[derive(Debug, Default)]
pub struct CrossListStore {
    tracked: RwLock<HashMap<u64, TrackedEntry>>,
    watch: RwLock<HashMap<String, WatchEntry>>,
    filter: RwLock<HashMap<String, FilterEntry>>,
    next_id: AtomicU64,
}

impl CrossListStore {
    pub fn new() -> Self {
        Self {
            tracked: RwLock::new(HashMap::new()),
            watch: RwLock::new(HashMap::new()),
            filter: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn assign_id(&self) -> u64 {
        self.next_id.fetch_add(1, AtomicOrdering::Relaxed)
    }

    /// Add an entry to the tracked list.
    ///
    /// Rejects entries without a title or a valid info link, and entries
    /// whose link is already tracked. On success any watch or filter entry
    /// with the same link is evicted. Returns whether the entry was added.
    pub fn add_tracked(&self, mut entry: TrackedEntry) -> bool {
        if entry.title.trim().is_empty() || !entry.info_link.is_valid() {
            debug!(link = %entry.info_link, "Rejected tracked entry: missing title or link");
            return false;
        }

        let mut tracked = self.tracked.write().expect("tracked list lock poisoned");
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        if tracked.values().any(|e| e.info_link == entry.info_link) {
            debug!(link = %entry.info_link, "Rejected tracked entry: link already tracked");
            return false;
        }

        if entry.id == 0 {
            entry.id = self.assign_id();
        }
        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }

        let key = entry.info_link.as_str().to_string();
        if watch.remove(&key).is_some() {
            debug!(link = %key, "Evicted watch entry superseded by tracked entry");
        }
        if filter.remove(&key).is_some() {
            debug!(link = %key, "Evicted filter entry superseded by tracked entry");
        }

        debug!(id = entry.id, title = %entry.title, "Added tracked entry");
        tracked.insert(entry.id, entry);
        true
    }

    /// Add an entry to the watch list.
    ///
    /// Rejects blank links and links already on the watch list. On success
    /// any filter entry with the same link is removed, and a missing
    /// thumbnail is filled with the sentinel.
    pub fn add_to_watch(&self, mut entry: WatchEntry) -> bool {
        if entry.info_link.as_str().is_empty() {
            debug!("Rejected watch entry: blank info link");
            return false;
        }

        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        let key = entry.info_link.as_str().to_string();
        if watch.contains_key(&key) {
            debug!(link = %key, "Rejected watch entry: already on watch list");
            return false;
        }

        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }

        if filter.remove(&key).is_some() {
            debug!(link = %key, "Moved entry from filter list to watch list");
        }

        watch.insert(key, entry);
        true
    }

    /// Add an entry to the filter list; mirror of [`add_to_watch`].
    ///
    /// [`add_to_watch`]: CrossListStore::add_to_watch
    pub fn add_to_filter(&self, mut entry: FilterEntry) -> bool {
        if entry.info_link.as_str().is_empty() {
            debug!("Rejected filter entry: blank info link");
            return false;
        }

        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        let key = entry.info_link.as_str().to_string();
        if filter.contains_key(&key) {
            debug!(link = %key, "Rejected filter entry: already on filter list");
            return false;
        }

        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }

        if watch.remove(&key).is_some() {
            debug!(link = %key, "Moved entry from watch list to filter list");
        }

        filter.insert(key, entry);
        true
    }

    /// Remove the tracked entry with the given link. Idempotent; returns
    /// whether something was removed.
    pub fn remove_from_tracked(&self, link: &InfoLink) -> bool {
        let mut tracked = self.tracked.write().expect("tracked list lock poisoned");
        let id = tracked
            .values()
            .find(|e| &e.info_link == link)
            .map(|e| e.id);
        match id {
            Some(id) => tracked.remove(&id).is_some(),
            None => false,
        }
    }

    /// Remove the watch entry with the given link. Idempotent.
    pub fn remove_from_watch(&self, link: &InfoLink) -> bool {
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        watch.remove(link.as_str()).is_some()
    }

    /// Remove the filter entry with the given link. Idempotent.
    pub fn remove_from_filter(&self, link: &InfoLink) -> bool {
        let mut filter = self.filter.write().expect("filter list lock poisoned");
        filter.remove(link.as_str()).is_some()
    }

    /// Upsert a tracked entry, keyed by its id.
    ///
    /// An entry carrying no id reuses the id of the tracked entry with
    /// the same info link, if any, so an upsert can never create a second
    /// tracked entry for one link; otherwise a fresh id is assigned. Any
    /// watch or filter entry with the same link is evicted, as on
    /// [`add_tracked`].
    ///
    /// [`add_tracked`]: CrossListStore::add_tracked
    pub fn update_or_create_tracked(&self, mut entry: TrackedEntry) {
        let mut tracked = self.tracked.write().expect("tracked list lock poisoned");
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        if entry.id == 0 {
            entry.id = tracked
                .values()
                .find(|e| e.info_link.is_valid() && e.info_link == entry.info_link)
                .map(|e| e.id)
                .unwrap_or_else(|| self.assign_id());
        }
        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }

        let key = entry.info_link.as_str();
        if !key.is_empty() {
            if watch.remove(key).is_some() {
                debug!(link = %key, "Evicted watch entry superseded by tracked entry");
            }
            if filter.remove(key).is_some() {
                debug!(link = %key, "Evicted filter entry superseded by tracked entry");
            }
        }
        tracked.insert(entry.id, entry);
    }

    /// Upsert a watch entry, keyed by its info link. Evicts a filter
    /// entry with the same link, keeping the exclusivity invariant.
    pub fn update_or_create_watch(&self, mut entry: WatchEntry) {
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }
        let key = entry.info_link.as_str().to_string();
        if filter.remove(&key).is_some() {
            debug!(link = %key, "Moved entry from filter list to watch list");
        }
        watch.insert(key, entry);
    }

    /// Upsert a filter entry, keyed by its info link. Evicts a watch
    /// entry with the same link, keeping the exclusivity invariant.
    pub fn update_or_create_filter(&self, mut entry: FilterEntry) {
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");

        if entry.thumbnail.trim().is_empty() {
            entry.thumbnail = NO_PICTURE_THUMBNAIL.to_string();
        }
        let key = entry.info_link.as_str().to_string();
        if watch.remove(&key).is_some() {
            debug!(link = %key, "Moved entry from watch list to filter list");
        }
        filter.insert(key, entry);
    }

    /// Snapshot of the tracked list, title-ascending.
    pub fn fetch_tracked_list(&self) -> Vec<TrackedEntry> {
        let tracked = self.tracked.read().expect("tracked list lock poisoned");
        let mut entries: Vec<TrackedEntry> = tracked.values().cloned().collect();
        entries.sort_by(|a, b| title_cmp(&a.title, &b.title));
        entries
    }

    /// Snapshot of the watch list, title-ascending.
    pub fn fetch_watch_list(&self) -> Vec<WatchEntry> {
        let watch = self.watch.read().expect("watch list lock poisoned");
        let mut entries: Vec<WatchEntry> = watch.values().cloned().collect();
        entries.sort_by(|a, b| title_cmp(&a.title, &b.title));
        entries
    }

    /// Snapshot of the filter list, title-ascending.
    pub fn fetch_filter_list(&self) -> Vec<FilterEntry> {
        let filter = self.filter.read().expect("filter list lock poisoned");
        let mut entries: Vec<FilterEntry> = filter.values().cloned().collect();
        entries.sort_by(|a, b| title_cmp(&a.title, &b.title));
        entries
    }

    /// True iff any of the three lists holds an entry with the given link.
    pub fn contains(&self, link: &InfoLink) -> bool {
        let tracked = self.tracked.read().expect("tracked list lock poisoned");
        let watch = self.watch.read().expect("watch list lock poisoned");
        let filter = self.filter.read().expect("filter list lock poisoned");
        tracked.values().any(|e| &e.info_link == link)
            || watch.contains_key(link.as_str())
            || filter.contains_key(link.as_str())
    }

    /// Empty all three lists. Used for process and test session reset.
    pub fn clear(&self) {
        let mut tracked = self.tracked.write().expect("tracked list lock poisoned");
        let mut watch = self.watch.write().expect("watch list lock poisoned");
        let mut filter = self.filter.write().expect("filter list lock poisoned");
        tracked.clear();
        watch.clear();
        filter.clear();
        debug!("Cleared all lists");
    }
}

/// Case-insensitive title ordering. Blank titles form their own
/// equivalence class after the titled entries, so they keep their
/// encounter order relative to each other under the stable sort while
/// the comparison stays total (`sort_by` may panic on a non-total order).
fn title_cmp(a: &str, b: &str) -> Ordering {
    let a_blank = a.trim().is_empty();
    let b_blank = b.trim().is_empty();
    if a_blank || b_blank {
        return a_blank.cmp(&b_blank);
    }
    a.to_lowercase().cmp(&b.to_lowercase())
}
