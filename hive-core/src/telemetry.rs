//! # Telemetry
//!
//! 日志分类目标。所有结构化日志都带有以下 target 之一，便于外部聚合：
//!
//! ```text
//! RUST_LOG=hive::task=info,hive::scrape=debug
//! ```
//!
//! The categories are not a stable machine contract.

/// Task start / completion / drop
pub const TASK: &str = "hive::task";

/// Knowledge document loads, saves, repairs and peer transfers
pub const KNOWLEDGE: &str = "hive::knowledge";

/// Fetch attempts and scrape pipelines
pub const SCRAPE: &str = "hive::scrape";

/// Health monitor heartbeats
pub const MONITOR: &str = "hive::monitor";

/// Failures caught at a component boundary
pub const ERROR: &str = "hive::error";

/// Every category, in display order
pub const CATEGORIES: [&str; 5] = [TASK, KNOWLEDGE, SCRAPE, MONITOR, ERROR];
