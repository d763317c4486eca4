//! Error types for the extraction pipeline.

use thiserror::Error;

/// Failure modes of a single page fetch.
///
/// Parse problems are never errors: a degraded field falls back to a
/// documented default and a dead page yields no record, both handled
/// inside the extractors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The info link did not parse as an absolute http(s) URL; no network
    /// call was made.
    #[error("invalid info link: {0:?}")]
    InvalidLink(String),

    /// The server kept answering 429 until the retry cap was exhausted.
    #[error("rate limited, gave up after {retries} retries")]
    RateLimited { retries: u32 },

    /// Network-level I/O failure; no partial content is returned.
    #[error("request failed")]
    Network(#[from] reqwest::Error),
}
