//! # Hive Core Library
//!
//! Multi-agent task orchestration: a fixed set of ranked agents, each owning
//! a durable knowledge document, cooperating through a shared priority queue.
//!
//! ## Architecture
//!
//! - **Agent**: role abstraction, typed actions and the agent registry
//! - **Scheduler**: rank-ordered single consumer with timeout and panic containment
//! - **Producers**: bootstrap seeds, random generator, scrape pipelines, health monitor
//! - **Fetch**: retrying HTTP fetcher with a write-once page cache
//! - **Storage**: self-healing knowledge documents with backup/restore on save
//! - **Config**: layered TOML + environment configuration
//! - **Runtime**: lifecycle (`Hive::run`, `Hive::run_until_idle`) and shutdown
//!
//! ```text
//! producers ─┐
//! agents ────┼─▶ TaskSender ─▶ Scheduler ─▶ Agent::execute ─▶ KnowledgeStore
//! callers ───┘
//! ```

pub use hive_types::*;

pub mod agent;
pub mod config;
pub mod error;
pub mod fetch;
pub mod producers;
pub mod runtime;
pub mod scheduler;
pub mod storage;
pub mod telemetry;

pub use agent::{Agent, AgentAction, AgentRegistry, ExecutionEnv, ExecutionOutcome, Role};
pub use config::{ConfigLoader, HiveConfig};
pub use error::{HiveError, Result};
pub use fetch::ResourceFetcher;
pub use runtime::{AgentStatus, Hive, ShutdownController, ShutdownSignal};
pub use scheduler::{Scheduler, SchedulerStats, TaskSender};
pub use storage::KnowledgeStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
