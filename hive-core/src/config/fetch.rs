//! # Fetch Configuration
//!
//! Timeout, retry and extraction limits for the resource fetcher.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{validate_positive, validation_error, ValidateConfig};
use crate::error::Result;

/// Default request timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per URL (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default initial backoff in milliseconds
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 4_000;

/// Default backoff ceiling in milliseconds
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 10_000;

/// Default number of links kept per page
pub const DEFAULT_MAX_LINKS: usize = 200;

/// Resource fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per URL before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubled afterwards
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_ms: u64,

    /// Links kept per page
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_base() -> u64 {
    DEFAULT_BACKOFF_BASE_MS
}

fn default_backoff_cap() -> u64 {
    DEFAULT_BACKOFF_CAP_MS
}

fn default_max_links() -> usize {
    DEFAULT_MAX_LINKS
}

fn default_user_agent() -> String {
    format!("hive/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_cap_ms: default_backoff_cap(),
            max_links: default_max_links(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.backoff_base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.backoff_cap_ms))
    }

    /// Longest a failing fetch can take: every request timing out plus
    /// the backoff between attempts
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        let backoff: Duration = (1..attempts).map(|n| self.backoff_after(n)).sum();
        self.timeout() * attempts + backoff
    }
}

impl ValidateConfig for FetchConfig {
    fn validate(&self) -> Result<()> {
        validate_positive(self.timeout_secs, "fetch.timeout_secs")?;
        validate_positive(self.max_attempts as u64, "fetch.max_attempts")?;
        if self.backoff_cap_ms < self.backoff_base_ms {
            return Err(validation_error(format!(
                "fetch.backoff_cap_ms ({}) must be >= fetch.backoff_base_ms ({})",
                self.backoff_cap_ms, self.backoff_base_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let config = FetchConfig::default();
        assert_eq!(config.backoff_after(1), Duration::from_secs(4));
        assert_eq!(config.backoff_after(2), Duration::from_secs(8));
        assert_eq!(config.backoff_after(3), Duration::from_secs(10));
        assert_eq!(config.backoff_after(40), Duration::from_secs(10));
    }

    #[test]
    fn test_worst_case_counts_every_attempt() {
        let config = FetchConfig::default();
        // 3 x 60s + 4s + 8s
        assert_eq!(config.worst_case(), Duration::from_secs(192));

        let single = FetchConfig {
            max_attempts: 1,
            ..FetchConfig::default()
        };
        assert_eq!(single.worst_case(), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_backoff_order() {
        let mut config = FetchConfig::default();
        config.backoff_cap_ms = 10;
        assert!(config.validate().is_err());

        config.backoff_base_ms = 0;
        config.backoff_cap_ms = 0;
        assert!(config.validate().is_ok());
    }
}
