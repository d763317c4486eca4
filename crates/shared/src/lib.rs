//! Shared library for the anime catalogue.
//!
//! This crate provides the pieces used by every binary:
//! - Configuration management
//! - Data models (info links, anime records, list entries)
//! - The cross-list store
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::{
    AnimeRecord, AnimeType, FilterEntry, InfoLink, TrackedEntry, WatchEntry, NO_PICTURE,
    NO_PICTURE_THUMBNAIL,
};
pub use store::CrossListStore;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
