use serde::{Deserialize, Serialize};

/// Visible text and outgoing links of one fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub content: String,
    pub links: Vec<String>,
}

impl ScrapeResult {
    pub fn new(url: impl Into<String>, content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            links,
        }
    }

    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}
