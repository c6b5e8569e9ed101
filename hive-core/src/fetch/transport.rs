//! HTTP 传输层
//!
//! `ResourceFetcher` 只依赖 `HttpTransport`，默认实现基于 `reqwest::Client`。

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::error::{HiveError, Result};

/// Status and body of one GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Transport-level failures are `HiveError::Fetch`; HTTP error codes are
    /// returned as a response.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// 默认传输实现
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HiveError::fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HiveError::fetch(format!("GET {} failed: {}", url, e)))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| HiveError::fetch(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(HttpResponse { status, body })
    }
}
