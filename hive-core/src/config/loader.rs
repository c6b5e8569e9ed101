//! # Configuration Loader
//!
//! Loads and merges configuration from multiple sources:
//! 1. Default values (lowest priority)
//! 2. Configuration file (middle priority)
//! 3. Environment variables (highest priority)

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::HiveConfig;
use crate::error::{HiveError, Result};
use crate::storage::Paths;

/// Configuration loader with support for file and environment variable overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Path to configuration file
    config_path: PathBuf,

    /// Environment variable prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "HIVE".to_string(),
        }
    }
}

impl ConfigLoader {
    /// Create a new config loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config loader with a specific config file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: "HIVE".to_string(),
        }
    }

    /// Override the environment variable prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the default configuration file path
    fn default_config_path() -> PathBuf {
        // Check for HIVE_CONFIG environment variable first
        if let Ok(config_path) = env::var("HIVE_CONFIG") {
            return PathBuf::from(config_path);
        }

        let possible_paths = [
            PathBuf::from("hive.toml"),
            Paths::config_file(),
        ];

        for path in &possible_paths {
            if path.exists() {
                return path.clone();
            }
        }

        possible_paths[0].clone()
    }

    /// Load configuration with full hierarchy from the process environment
    pub fn load(&self) -> Result<HiveConfig> {
        self.load_with_env(env::vars())
    }

    /// Load configuration using an explicit set of environment variables
    pub fn load_with_env<I>(&self, vars: I) -> Result<HiveConfig>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // 1. Start with defaults, or the file when it exists
        let mut config = if self.config_path.exists() {
            self.load_from_file()?
        } else {
            HiveConfig::default()
        };

        // 2. Merge environment variables (highest priority)
        let vars: HashMap<String, String> = vars.into_iter().collect();
        self.merge_env_config(&mut config, &vars)?;

        // 3. Validate the final configuration
        config.validate().map_err(|e| {
            HiveError::configuration(format!("Configuration validation failed: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from file
    fn load_from_file(&self) -> Result<HiveConfig> {
        let content = std::fs::read_to_string(&self.config_path).map_err(|e| {
            HiveError::configuration(format!(
                "Failed to read config file '{}': {}",
                self.config_path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            HiveError::configuration(format!(
                "Failed to parse config file '{}': {}",
                self.config_path.display(),
                e
            ))
        })
    }

    fn merge_env_config(
        &self,
        config: &mut HiveConfig,
        vars: &HashMap<String, String>,
    ) -> Result<()> {
        let lookup = |name: &str| vars.get(&format!("{}_{}", self.env_prefix, name));

        // Scheduler
        if let Some(val) = lookup("SCHEDULER_TASK_TIMEOUT_SECS") {
            config.scheduler.task_timeout_secs = parse(val, "SCHEDULER_TASK_TIMEOUT_SECS")?;
        }

        // Fetch
        if let Some(val) = lookup("FETCH_TIMEOUT_SECS") {
            config.fetch.timeout_secs = parse(val, "FETCH_TIMEOUT_SECS")?;
        }
        if let Some(val) = lookup("FETCH_MAX_ATTEMPTS") {
            config.fetch.max_attempts = parse(val, "FETCH_MAX_ATTEMPTS")?;
        }
        if let Some(val) = lookup("FETCH_BACKOFF_BASE_MS") {
            config.fetch.backoff_base_ms = parse(val, "FETCH_BACKOFF_BASE_MS")?;
        }
        if let Some(val) = lookup("FETCH_BACKOFF_CAP_MS") {
            config.fetch.backoff_cap_ms = parse(val, "FETCH_BACKOFF_CAP_MS")?;
        }
        if let Some(val) = lookup("FETCH_MAX_LINKS") {
            config.fetch.max_links = parse(val, "FETCH_MAX_LINKS")?;
        }
        if let Some(val) = lookup("FETCH_USER_AGENT") {
            config.fetch.user_agent = val.clone();
        }

        // Producers
        if let Some(val) = lookup("PRODUCERS_GENERATOR_INTERVAL_SECS") {
            config.producers.generator_interval_secs =
                parse(val, "PRODUCERS_GENERATOR_INTERVAL_SECS")?;
        }
        if let Some(val) = lookup("PRODUCERS_MONITOR_INTERVAL_SECS") {
            config.producers.monitor_interval_secs =
                parse(val, "PRODUCERS_MONITOR_INTERVAL_SECS")?;
        }
        if let Some(val) = lookup("PRODUCERS_RESCRAPE_INTERVAL_SECS") {
            config.producers.rescrape_interval_secs =
                parse(val, "PRODUCERS_RESCRAPE_INTERVAL_SECS")?;
        }
        if let Some(val) = lookup("PRODUCERS_BOOTSTRAP_OBJECTIVE") {
            config.producers.bootstrap_objective = val.clone();
        }
        if let Some(val) = lookup("PRODUCERS_URL_LIST") {
            config.producers.url_list = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("PRODUCERS_GENERATOR_SEED") {
            config.producers.generator_seed = Some(parse(val, "PRODUCERS_GENERATOR_SEED")?);
        }

        // Storage (both spellings; HIVE_DATA_DIR also drives Paths::data_dir)
        if let Some(val) = lookup("STORAGE_DATA_DIR").or_else(|| lookup("DATA_DIR")) {
            config.storage.data_dir = PathBuf::from(val);
        }

        Ok(())
    }
}

fn parse<T: FromStr>(value: &str, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        HiveError::configuration(format!("Invalid value '{}' for {}: {}", value, name, e))
    })
}
