//! # Storage Module
//!
//! 每个 Agent 独立的知识文档持久化。
//!
//! ## 模块结构
//!
//! - `paths`: 跨平台目录路径管理
//! - `backup`: 写入前备份与失败恢复
//! - `knowledge`: 知识文档加载/保存（自愈读取）

pub mod backup;
pub mod knowledge;
pub mod paths;

pub use backup::DocumentBackup;
pub use knowledge::{DocumentWriter, FsDocumentWriter, KnowledgeStore};
pub use paths::Paths;
