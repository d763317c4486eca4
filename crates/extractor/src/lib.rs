//! Extraction pipeline for the anime catalogue.
//!
//! Turns raw URLs into structured anime records by scraping the supported
//! source sites: registry -> normalize -> fetch -> parse -> store.

pub mod error;
pub mod fetcher;
pub mod mal;
pub mod pipeline;
pub mod registry;

pub use error::FetchError;
pub use fetcher::ContentFetcher;
pub use mal::MalPlugin;
pub use pipeline::{ExtractionPipeline, PipelineStats};
pub use registry::{ExtractorRegistry, SitePlugin};
