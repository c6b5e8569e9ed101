//! # Storage Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{validate_non_empty_path, ValidateConfig};
use crate::error::Result;
use crate::storage::Paths;

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Data root; knowledge documents live under `<data_dir>/knowledge`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    Paths::data_dir()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn knowledge_dir(&self) -> PathBuf {
        Paths::knowledge_dir_in(&self.data_dir)
    }
}

impl ValidateConfig for StorageConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_path(&self.data_dir, "storage.data_dir")
    }
}
