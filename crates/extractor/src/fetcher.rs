//! Page fetcher with rate-limit backoff.
//!
//! One outbound GET per call, sent with a fixed browser-identifying header
//! set. HTTP 429 responses are retried after a randomized sleep, capped by
//! a configurable retry budget.

use crate::error::FetchError;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use shared::InfoLink;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// HTTP fetcher for catalogue pages.
pub struct ContentFetcher {
    client: Client,
    /// Maximum retries after a 429 before giving up.
    max_rate_limit_retries: u32,
    /// Randomized backoff window in milliseconds, upper bound exclusive.
    backoff_min_ms: u64,
    backoff_max_ms: u64,
}

impl ContentFetcher {
    /// Create a new fetcher.
    pub fn new(
        user_agent: &str,
        accept: &str,
        request_timeout_secs: u64,
        max_rate_limit_retries: u32,
        backoff_min_ms: u64,
        backoff_max_ms: u64,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(accept)?);

        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_rate_limit_retries,
            backoff_min_ms,
            backoff_max_ms,
        })
    }

    /// Build a fetcher from the scraper section of the config file.
    pub fn from_config(config: &shared::config::ScraperConfig) -> anyhow::Result<Self> {
        Self::new(
            &config.user_agent,
            &config.accept,
            config.request_timeout_secs,
            config.max_rate_limit_retries,
            config.backoff_min_ms,
            config.backoff_max_ms,
        )
    }

    /// Fetch the page behind a normalized info link.
    ///
    /// Invalid links fail fast without a network call. A 429 response
    /// sleeps for a uniformly random duration inside the backoff window
    /// and retries the same request until the retry budget is spent.
    /// Other non-200 statuses are logged but the body is still returned;
    /// the extractors decide whether it is usable.
    ///
    /// Blocks the calling task for the duration of network I/O plus any
    /// backoff sleep; must not be called while holding a store lock.
    pub async fn fetch(&self, link: &InfoLink) -> Result<String, FetchError> {
        if !link.is_valid() {
            warn!(link = %link, "Refusing to fetch invalid info link");
            return Err(FetchError::InvalidLink(link.as_str().to_string()));
        }

        for attempt in 0..=self.max_rate_limit_retries {
            debug!(link = %link, attempt = attempt + 1, "Fetching page");

            let response = self.client.get(link.as_str()).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt == self.max_rate_limit_retries {
                    break;
                }
                let wait = Duration::from_millis(self.backoff_duration_ms());
                warn!(
                    link = %link,
                    wait_ms = wait.as_millis(),
                    "Rate limited by server, backing off"
                );
                sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                // Degrade path: the body may still contain a usable page
                // (or the dead-page markers the extractor looks for).
                error!(link = %link, status = %status, "Page request returned non-success status");
            }

            return Ok(response.text().await?);
        }

        Err(FetchError::RateLimited {
            retries: self.max_rate_limit_retries,
        })
    }

    fn backoff_duration_ms(&self) -> u64 {
        if self.backoff_min_ms >= self.backoff_max_ms {
            return self.backoff_min_ms;
        }
        rand::thread_rng().gen_range(self.backoff_min_ms..self.backoff_max_ms)
    }
}
