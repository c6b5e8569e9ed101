//! # Hive Configuration Center
//!
//! Unified configuration management for Hive.
//!
//! ## Configuration Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Environment Variables           │
//! │    HIVE_SCHEDULER_TASK_TIMEOUT_SECS=30  │
//! ├─────────────────────────────────────────┤
//! │         Config File (hive.toml)         │
//! │    [scheduler]                          │
//! │    task_timeout_secs = 30               │
//! ├─────────────────────────────────────────┤
//! │         Default Values                  │
//! └─────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod fetch;
mod loader;
mod storage;

pub use fetch::{
    FetchConfig, DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_CAP_MS, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_LINKS,
};
pub use loader::ConfigLoader;
pub use storage::StorageConfig;

use crate::error::{HiveError, Result};

/// Default per-task execution budget in seconds
pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 30;

/// Default generator interval in seconds
pub const DEFAULT_GENERATOR_INTERVAL_SECS: u64 = 15;

/// Default health monitor interval in seconds
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 30;

/// Default bootstrap objective
pub const DEFAULT_OBJECTIVE: &str = "expand_world";

/// Content length above which the archivist schedules a deep pass
pub const DEFAULT_CONTENT_THRESHOLD: usize = 2000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HiveConfig {
    /// Scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Resource fetcher configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Background producer configuration
    #[serde(default)]
    pub producers: ProducerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl HiveConfig {
    /// Load configuration with full hierarchy (defaults -> file -> env)
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific path
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        ConfigLoader::with_path(path).load()
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()?;
        self.fetch.validate()?;
        self.producers.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// URL list location: explicit setting or `<data_dir>/urls.txt`
    pub fn url_list_path(&self) -> PathBuf {
        self.producers
            .url_list
            .clone()
            .unwrap_or_else(|| self.storage.data_dir.join("urls.txt"))
    }
}

/// Trait for configuration validation
pub trait ValidateConfig {
    /// Validate configuration values
    fn validate(&self) -> Result<()>;
}

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Per-task execution timeout
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,
}

fn default_task_timeout() -> u64 {
    DEFAULT_TASK_TIMEOUT_SECS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: default_task_timeout(),
        }
    }
}

impl SchedulerConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Time a task may spend fetching, four fifths of the task timeout
    pub fn fetch_budget(&self) -> Duration {
        self.task_timeout() * 4 / 5
    }
}

impl ValidateConfig for SchedulerConfig {
    fn validate(&self) -> Result<()> {
        validate_positive(self.task_timeout_secs, "scheduler.task_timeout_secs")
    }
}

/// Background producer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProducerConfig {
    /// Interval between generated tasks
    #[serde(default = "default_generator_interval")]
    pub generator_interval_secs: u64,

    /// Interval between health checks
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,

    /// Interval between scrape passes; 0 runs each pipeline only once
    #[serde(default)]
    pub rescrape_interval_secs: u64,

    /// Objective seeded into the planner at startup
    #[serde(default = "default_objective")]
    pub bootstrap_objective: String,

    /// Flat URL list, one per line
    #[serde(default)]
    pub url_list: Option<PathBuf>,

    /// Archivist deep-processing threshold (characters)
    #[serde(default = "default_content_threshold")]
    pub content_threshold: usize,

    /// Fixed RNG seed for the generator (random when absent)
    #[serde(default)]
    pub generator_seed: Option<u64>,
}

fn default_generator_interval() -> u64 {
    DEFAULT_GENERATOR_INTERVAL_SECS
}

fn default_monitor_interval() -> u64 {
    DEFAULT_MONITOR_INTERVAL_SECS
}

fn default_objective() -> String {
    DEFAULT_OBJECTIVE.to_string()
}

fn default_content_threshold() -> usize {
    DEFAULT_CONTENT_THRESHOLD
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            generator_interval_secs: default_generator_interval(),
            monitor_interval_secs: default_monitor_interval(),
            rescrape_interval_secs: 0,
            bootstrap_objective: default_objective(),
            url_list: None,
            content_threshold: default_content_threshold(),
            generator_seed: None,
        }
    }
}

impl ProducerConfig {
    pub fn generator_interval(&self) -> Duration {
        Duration::from_secs(self.generator_interval_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    pub fn rescrape_interval(&self) -> Option<Duration> {
        (self.rescrape_interval_secs > 0).then(|| Duration::from_secs(self.rescrape_interval_secs))
    }
}

impl ValidateConfig for ProducerConfig {
    fn validate(&self) -> Result<()> {
        validate_positive(self.generator_interval_secs, "producers.generator_interval_secs")?;
        validate_positive(self.monitor_interval_secs, "producers.monitor_interval_secs")?;
        if self.bootstrap_objective.trim().is_empty() {
            return Err(validation_error("producers.bootstrap_objective cannot be empty"));
        }
        if self.content_threshold == 0 {
            return Err(validation_error("producers.content_threshold cannot be zero"));
        }
        Ok(())
    }
}

/// Configuration error helper
fn validation_error(msg: impl Into<String>) -> HiveError {
    HiveError::configuration(format!("Validation error: {}", msg.into()))
}

/// Validate a counter or duration is non-zero
fn validate_positive(value: u64, name: &str) -> Result<()> {
    if value == 0 {
        return Err(validation_error(format!("{} cannot be zero", name)));
    }
    Ok(())
}

/// Validate path is not empty
fn validate_non_empty_path(path: &std::path::Path, name: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(validation_error(format!("{} path cannot be empty", name)));
    }
    Ok(())
}
