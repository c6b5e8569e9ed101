//! # Resource Fetcher
//!
//! Retrying, cached loader for external pages.
//!
//! - Cache first: a URL that has been fetched successfully once is never
//!   requested again during the process lifetime.
//! - Failure (non-200 or transport error) is retried with exponential
//!   backoff up to `max_attempts`, after which the fetch degrades to `None`.
//!   Errors never escape this module.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use hive_types::ScrapeResult;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::Result;
use crate::telemetry;

pub mod html;
mod transport;

pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

pub struct ResourceFetcher {
    transport: Arc<dyn HttpTransport>,
    cache: DashMap<String, ScrapeResult>,
    config: FetchConfig,
}

impl std::fmt::Debug for ResourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFetcher")
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ResourceFetcher {
    /// Fetcher backed by a `reqwest` client
    pub fn new(config: FetchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: FetchConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            cache: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Previously fetched result, without network activity
    pub fn cached(&self, url: &str) -> Option<ScrapeResult> {
        self.cache.get(url).map(|entry| entry.value().clone())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Fetch one URL; `None` after exhausting all attempts.
    pub async fn fetch(&self, url: &str) -> Option<ScrapeResult> {
        if let Some(hit) = self.cached(url) {
            debug!(target: telemetry::SCRAPE, url, "Cache hit");
            return Some(hit);
        }

        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            debug!(
                target: telemetry::SCRAPE,
                url,
                attempt,
                max_attempts,
                "Fetching"
            );

            match self.transport.get(url).await {
                Ok(resp) if resp.is_ok() => {
                    let result = ScrapeResult::new(
                        url,
                        html::visible_text(&resp.body),
                        html::extract_links(&resp.body, url, self.config.max_links),
                    );
                    info!(
                        target: telemetry::SCRAPE,
                        url,
                        attempt,
                        chars = result.content_len(),
                        links = result.links.len(),
                        "Fetched"
                    );
                    // write-once: a concurrent fetch of the same URL keeps the first result
                    let entry = self.cache.entry(url.to_string()).or_insert(result);
                    return Some(entry.value().clone());
                }
                Ok(resp) => {
                    warn!(
                        target: telemetry::SCRAPE,
                        url,
                        attempt,
                        status = resp.status,
                        "Fetch returned non-success status"
                    );
                }
                Err(e) => {
                    warn!(
                        target: telemetry::SCRAPE,
                        url,
                        attempt,
                        "Fetch failed: {}",
                        e
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.backoff_after(attempt)).await;
            }
        }

        warn!(
            target: telemetry::SCRAPE,
            url,
            attempts = max_attempts,
            "Giving up"
        );
        None
    }

    /// Like [`fetch`](Self::fetch), but gives up once `budget` has elapsed
    pub async fn fetch_within(&self, url: &str, budget: Duration) -> Option<ScrapeResult> {
        match tokio::time::timeout(budget, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target: telemetry::SCRAPE,
                    url,
                    budget_ms = budget.as_millis() as u64,
                    "Fetch budget exhausted"
                );
                None
            }
        }
    }

    /// Fetch every URL concurrently; one failure does not affect the others.
    pub async fn fetch_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<(String, Option<ScrapeResult>)> {
        let fetches = urls.iter().map(|url| async move {
            let url = url.as_ref();
            (url.to_string(), self.fetch(url).await)
        });
        join_all(fetches).await
    }
}
