//! 备份管理模块
//!
//! 覆盖写入前把现有文档复制到 `<file>.bak`，写入失败时由备份恢复，
//! 保证持久化状态永远不会停留在半写入状态。

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{HiveError, Result};
use crate::telemetry;

/// 单个文档的备份句柄
#[derive(Debug, Clone)]
pub struct DocumentBackup {
    original: PathBuf,
    backup: PathBuf,
    /// 备份时原文件是否存在
    had_original: bool,
}

impl DocumentBackup {
    /// 备份文件路径 (`<file>.bak`)
    pub fn backup_path(original: &Path) -> PathBuf {
        let mut name = original.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// 创建备份：原文件存在则复制，不存在则记录为"无原始版本"
    pub async fn create(original: &Path) -> Result<Self> {
        let backup = Self::backup_path(original);
        let had_original = tokio::fs::try_exists(original).await.unwrap_or(false);

        if had_original {
            tokio::fs::copy(original, &backup).await.map_err(|e| {
                HiveError::storage(format!(
                    "Failed to back up {}: {}",
                    original.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            original: original.to_path_buf(),
            backup,
            had_original,
        })
    }

    pub fn had_original(&self) -> bool {
        self.had_original
    }

    /// 恢复备份
    ///
    /// 没有原始版本时删除半写入的文件。
    pub async fn restore(&self) -> Result<()> {
        if self.had_original {
            tokio::fs::copy(&self.backup, &self.original)
                .await
                .map_err(|e| {
                    HiveError::storage(format!(
                        "Failed to restore {} from backup: {}",
                        self.original.display(),
                        e
                    ))
                })?;
        } else if let Err(e) = tokio::fs::remove_file(&self.original).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    target: telemetry::KNOWLEDGE,
                    path = %self.original.display(),
                    "Failed to remove partial document: {}",
                    e
                );
            }
        }
        Ok(())
    }
}
