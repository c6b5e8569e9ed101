//! CLI 子命令

use std::path::PathBuf;

use anyhow::Context;
use hive_core::{ConfigLoader, HiveConfig};

pub mod knowledge;
pub mod run;
pub mod status;

/// Flags shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
}

impl GlobalOptions {
    /// Layered config load, then command-line overrides and validation
    pub fn load_config(&self) -> anyhow::Result<HiveConfig> {
        let loader = match &self.config {
            Some(path) => ConfigLoader::with_path(path),
            None => ConfigLoader::new(),
        };
        let mut config = loader
            .load()
            .with_context(|| format!("failed to load {}", loader.config_path().display()))?;

        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
