//! 跨平台目录路径管理
//!
//! 遵循各平台规范：
//! - macOS: `~/Library/Application Support/hive`
//! - Linux: `~/.local/share/hive` 或 `$XDG_DATA_HOME/hive`
//! - Windows: `%LOCALAPPDATA%\hive`

use std::path::{Path, PathBuf};

/// 目录路径管理器
pub struct Paths;

impl Paths {
    /// 获取数据根目录
    ///
    /// 环境变量 `HIVE_DATA_DIR` 可覆盖默认路径
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("HIVE_DATA_DIR") {
            return PathBuf::from(dir);
        }

        dirs::data_local_dir()
            .map(|d| d.join("hive"))
            .unwrap_or_else(|| PathBuf::from(".hive"))
    }

    /// 默认配置文件路径 (`<config_dir>/hive/config.toml`)
    pub fn config_file() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("hive").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("/etc/hive/config.toml"))
    }

    /// 知识文档目录
    pub fn knowledge_dir_in(data_dir: &Path) -> PathBuf {
        data_dir.join("knowledge")
    }

    /// Agent 知识文档路径
    pub fn knowledge_file_in(data_dir: &Path, agent_id: &str) -> PathBuf {
        Self::knowledge_dir_in(data_dir).join(format!("{}.json", agent_id))
    }

    /// Agent id 只允许 `[A-Za-z0-9_-]`，防止路径穿越
    pub fn is_safe_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
