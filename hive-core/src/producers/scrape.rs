//! Scrape pipelines
//!
//! URLs come from a flat list (`#` comments and blank lines skipped) and are
//! grouped by the first substring rule they match. Each group gets one
//! [`ScrapePipeline`]; every fetched page becomes an
//! `archivist.process_content` task.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use hive_types::Task;
use tracing::{debug, info, warn};

use crate::agent::roles::archivist;
use crate::fetch::ResourceFetcher;
use crate::runtime::ShutdownSignal;
use crate::scheduler::TaskSender;
use crate::telemetry;

pub const GENERAL: &str = "general";

/// First match wins
const CATEGORY_RULES: [(&str, &[&str]); 4] = [
    ("protocol", &["telnet", "protocol", "gmcp", "mssp", "mccp"]),
    ("combat", &["combat", "battle", "pvp", "weapon"]),
    ("lore", &["lore", "story", "myth", "legend"]),
    ("rules", &["rules", "policy", "guide", "faq"]),
];

const BUILTIN_URLS: [&str; 6] = [
    "https://tintin.mudhalla.net/protocols/mssp/",
    "https://tintin.mudhalla.net/protocols/gmcp/",
    "https://www.gammon.com.au/forum/?id=10043",
    "https://en.wikipedia.org/wiki/MUD",
    "https://en.wikipedia.org/wiki/Combat_in_role-playing_games",
    "https://www.mudconnect.com/",
];

pub fn categorize(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lower.contains(needle)))
        .map(|(category, _)| *category)
        .unwrap_or(GENERAL)
}

/// URLs grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl UrlCatalog {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for url in urls {
            let url = url.into();
            categories
                .entry(categorize(&url).to_string())
                .or_default()
                .push(url);
        }
        Self { categories }
    }

    /// Parse list text; duplicates are kept only once
    pub fn parse(text: &str) -> Self {
        let mut seen = std::collections::HashSet::new();
        Self::from_urls(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .filter(|line| seen.insert(line.to_string())),
        )
    }

    pub fn builtin() -> Self {
        Self::from_urls(BUILTIN_URLS)
    }

    /// Load from `path`, falling back to the built-in list when the file is
    /// absent, unreadable or lists nothing.
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let catalog = Self::parse(&text);
                if catalog.is_empty() {
                    warn!(
                        target: telemetry::SCRAPE,
                        path = %path.display(),
                        "URL list is empty, using built-in list"
                    );
                    return Self::builtin();
                }
                info!(
                    target: telemetry::SCRAPE,
                    path = %path.display(),
                    urls = catalog.len(),
                    categories = catalog.categories.len(),
                    "URL list loaded"
                );
                catalog
            }
            Err(e) => {
                debug!(
                    target: telemetry::SCRAPE,
                    path = %path.display(),
                    "URL list unavailable ({}), using built-in list",
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn category(&self, name: &str) -> &[String] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, urls)| (name.as_str(), urls.as_slice()))
    }

    pub fn pipelines(&self, fetcher: &Arc<ResourceFetcher>) -> Vec<ScrapePipeline> {
        self.iter()
            .map(|(category, urls)| ScrapePipeline::new(category, urls.to_vec(), fetcher.clone()))
            .collect()
    }
}

pub struct ScrapePipeline {
    category: String,
    urls: Vec<String>,
    fetcher: Arc<ResourceFetcher>,
}

impl ScrapePipeline {
    pub fn new(category: impl Into<String>, urls: Vec<String>, fetcher: Arc<ResourceFetcher>) -> Self {
        Self {
            category: category.into(),
            urls,
            fetcher,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Fetch every URL once; returns the number of tasks enqueued
    pub async fn run_once(&self, sender: &TaskSender) -> usize {
        let mut enqueued = 0;
        for (url, result) in self.fetcher.fetch_all(self.urls.as_slice()).await {
            let Some(page) = result else {
                continue;
            };
            let task = Task::new(archivist::ID, "process_content")
                .with_param("source", url)
                .with_param("content", page.content)
                .with_param("category", self.category.as_str());
            match sender.enqueue(task) {
                Ok(()) => enqueued += 1,
                Err(e) => {
                    warn!(target: telemetry::SCRAPE, category = %self.category, "{}", e);
                    break;
                }
            }
        }

        info!(
            target: telemetry::SCRAPE,
            category = %self.category,
            urls = self.urls.len(),
            enqueued,
            "Scrape pass finished"
        );
        enqueued
    }
}

/// Run every pipeline concurrently once
pub async fn scrape_all(pipelines: &[ScrapePipeline], sender: &TaskSender) -> usize {
    join_all(pipelines.iter().map(|p| p.run_once(sender)))
        .await
        .into_iter()
        .sum()
}

/// One pass immediately, then one per `rescrape` interval until shutdown
pub async fn run_pipelines(
    pipelines: Vec<ScrapePipeline>,
    sender: TaskSender,
    mut shutdown: ShutdownSignal,
    rescrape: Option<Duration>,
) {
    if shutdown.is_triggered() {
        return;
    }
    scrape_all(&pipelines, &sender).await;

    let Some(interval) = rescrape else {
        return;
    };
    while !shutdown.sleep(interval).await {
        scrape_all(&pipelines, &sender).await;
    }
}
