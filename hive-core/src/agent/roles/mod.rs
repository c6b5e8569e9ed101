//! 内置角色
//!
//! | id | rank |
//! |---|---|
//! | overseer | 10 |
//! | architect | 9 |
//! | loremaster | 8 |
//! | archivist | 7 |
//! | combat | 6 |
//! | builder | 5 |
//! | social | 4 |
//! | gatekeeper | 3 |
//! | protocol | 2 |
//! | reviewer | 1 |

use serde_json::{Map, Value};

use super::Role;
use crate::error::{HiveError, Result};

pub mod architect;
pub mod archivist;
pub mod builder;
pub mod combat;
pub mod gatekeeper;
pub mod loremaster;
pub mod overseer;
pub mod protocol;
pub mod reviewer;
pub mod social;

pub use architect::Architect;
pub use archivist::{embed, keywords, Archivist, EMBEDDING_DIM};
pub use builder::Builder;
pub use combat::Combat;
pub use gatekeeper::Gatekeeper;
pub use loremaster::Loremaster;
pub use overseer::{plan_steps, Overseer};
pub use protocol::{telnet_option, Protocol, TELNET_OPTIONS};
pub use reviewer::Reviewer;
pub use social::Social;

pub fn standard_roles() -> Vec<Box<dyn Role>> {
    vec![
        Box::new(Overseer),
        Box::new(Architect),
        Box::new(Loremaster),
        Box::new(Archivist),
        Box::new(Combat),
        Box::new(Builder),
        Box::new(Social),
        Box::new(Gatekeeper),
        Box::new(Protocol),
        Box::new(Reviewer),
    ]
}

/// 31 进制字节折叠哈希，内容生成和嵌入共用
pub(crate) fn fold_hash(text: &str) -> u64 {
    text.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
}

/// Deterministic choice from a non-empty list
pub(crate) fn pick<'a>(seed: &str, options: &[&'a str]) -> &'a str {
    options[(fold_hash(seed) % options.len() as u64) as usize]
}

/// Lowercase, dash-separated key
pub(crate) fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Edit the object stored under `map[name]`, replacing anything that is not an object
pub(crate) fn with_section<F>(map: &mut Map<String, Value>, name: &str, edit: F)
where
    F: FnOnce(&mut Map<String, Value>),
{
    let mut section = match map.remove(name) {
        Some(Value::Object(section)) => section,
        _ => Map::new(),
    };
    edit(&mut section);
    map.insert(name.to_string(), Value::Object(section));
}

/// Stored entry as an object; scalar entries from older documents are rejected
pub(crate) fn record_mut<'a>(value: &'a mut Value, key: &str) -> Result<&'a mut Map<String, Value>> {
    value
        .as_object_mut()
        .ok_or_else(|| HiveError::invalid_input(format!("entry '{}' is not a record", key)))
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use hive_types::{KnowledgeDocument, Task};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use crate::agent::{AgentRegistry, ExecutionEnv, ExecutionOutcome};
    use crate::error::Result;
    use crate::scheduler::{Submission, TaskSender};
    use crate::storage::KnowledgeStore;

    /// Standard registry over a temp dir, with the raw submission stream
    pub struct Harness {
        pub env: ExecutionEnv,
        pub rx: mpsc::UnboundedReceiver<Submission>,
        _temp: TempDir,
    }

    impl Harness {
        pub fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let store = Arc::new(KnowledgeStore::new(temp.path().join("knowledge")));
            let registry = Arc::new(AgentRegistry::standard(store).unwrap());
            let (sender, rx) = TaskSender::channel();
            Self {
                env: ExecutionEnv::new(registry, sender),
                rx,
                _temp: temp,
            }
        }

        pub async fn run(&self, task: Task) -> Result<ExecutionOutcome> {
            let agent = self.env.peers.get(&task.target_agent).unwrap().clone();
            agent.execute(&task, &self.env).await
        }

        /// Directory holding `knowledge/`
        pub fn data_dir(&self) -> std::path::PathBuf {
            self._temp.path().to_path_buf()
        }

        pub async fn doc(&self, id: &str) -> KnowledgeDocument {
            self.env.peers.get(id).unwrap().snapshot().await
        }

        /// Every task submitted so far, batches flattened
        pub fn submitted(&mut self) -> Vec<Task> {
            let mut tasks = Vec::new();
            while let Ok(submission) = self.rx.try_recv() {
                tasks.extend(submission.into_tasks());
            }
            tasks
        }
    }
}
