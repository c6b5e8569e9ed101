use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::task::{Dependency, Task};

/// Top-level keys every persisted document must carry
pub const KNOWLEDGE_KEYS: [&str; 6] = [
    "mechanics",
    "lore",
    "projects",
    "tasks",
    "history",
    "embeddings",
];

/// One executed (or handed-off) task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub task: Task,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(task: Task) -> Self {
        Self {
            task,
            timestamp: Utc::now(),
        }
    }
}

/// Durable, schema-fixed record of what an agent has learned and produced.
///
/// No field carries a serde default: a document missing any of the six keys
/// fails to deserialize and is treated as corrupt by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub mechanics: Map<String, Value>,
    pub lore: Map<String, Value>,
    pub projects: Map<String, Value>,
    pub tasks: Vec<Value>,
    /// Append-only
    pub history: Vec<HistoryEntry>,
    pub embeddings: BTreeMap<String, Vec<f32>>,
}

impl KnowledgeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, task: Task) {
        self.history.push(HistoryEntry::now(task));
    }

    /// Scan history for a prior entry satisfying `dependency`
    pub fn has_completed(&self, dependency: &Dependency) -> bool {
        self.history
            .iter()
            .any(|entry| dependency.is_satisfied_by(&entry.task))
    }

    /// Number of history entries for a given action
    pub fn count_action(&self, action: &str) -> usize {
        self.history
            .iter()
            .filter(|entry| entry.task.action == action)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanics.is_empty()
            && self.lore.is_empty()
            && self.projects.is_empty()
            && self.tasks.is_empty()
            && self.history.is_empty()
            && self.embeddings.is_empty()
    }
}
