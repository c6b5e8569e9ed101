//! # Hive Types
//!
//! Data model shared by the scheduler, the agents and the knowledge store.

pub mod knowledge;
pub mod scrape;
pub mod task;

pub use knowledge::{HistoryEntry, KnowledgeDocument, KNOWLEDGE_KEYS};
pub use scrape::ScrapeResult;
pub use task::{AgentId, Dependency, Task, TaskId, TaskPriority};
