//! # Knowledge Store
//!
//! One pretty-printed JSON document per agent at `<root>/<agent_id>.json`.
//!
//! - `load` never fails. Missing, empty, unparsable or key-missing files are
//!   replaced by the schema default, which is written back immediately.
//! - `save` backs up the current file, writes, and restores the backup when
//!   the write fails.
//!
//! No locking happens here: each document is only mutated by its owning
//! agent, which serializes access through its own mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hive_types::KnowledgeDocument;
use tracing::{debug, error, info, warn};

use super::backup::DocumentBackup;
use super::paths::Paths;
use crate::error::{HiveError, Result};
use crate::telemetry;

/// Low-level byte sink used by [`KnowledgeStore::save`]
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// Default writer backed by `tokio::fs::write`
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentWriter;

#[async_trait]
impl DocumentWriter for FsDocumentWriter {
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, bytes).await
    }
}

/// Why a stored document was replaced by the default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    Missing,
    Empty,
    Corrupt,
}

pub struct KnowledgeStore {
    root: PathBuf,
    writer: Arc<dyn DocumentWriter>,
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("root", &self.root)
            .finish()
    }
}

impl KnowledgeStore {
    /// Store rooted at an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writer: Arc::new(FsDocumentWriter),
        }
    }

    /// Store rooted at `<data_dir>/knowledge`
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(Paths::knowledge_dir_in(data_dir))
    }

    /// Replace the byte sink (fault injection in tests)
    pub fn with_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, agent_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", agent_id))
    }

    /// Load an agent's document, repairing it when necessary.
    pub async fn load(&self, agent_id: &str) -> KnowledgeDocument {
        if !Paths::is_safe_id(agent_id) {
            error!(
                target: telemetry::ERROR,
                agent = agent_id,
                "Refusing to load knowledge for unsafe agent id"
            );
            return KnowledgeDocument::default();
        }

        let path = self.path_for(agent_id);
        let repair = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Repair::Empty,
            Ok(content) => match serde_json::from_str::<KnowledgeDocument>(&content) {
                Ok(doc) => {
                    debug!(
                        target: telemetry::KNOWLEDGE,
                        agent = agent_id,
                        history = doc.history.len(),
                        "Knowledge loaded"
                    );
                    return doc;
                }
                Err(e) => {
                    warn!(
                        target: telemetry::KNOWLEDGE,
                        agent = agent_id,
                        path = %path.display(),
                        "Knowledge document unreadable, resetting: {}",
                        e
                    );
                    Repair::Corrupt
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Repair::Missing,
            Err(e) => {
                warn!(
                    target: telemetry::KNOWLEDGE,
                    agent = agent_id,
                    "Failed to read knowledge document, resetting: {}",
                    e
                );
                Repair::Corrupt
            }
        };

        let doc = KnowledgeDocument::default();
        info!(
            target: telemetry::KNOWLEDGE,
            agent = agent_id,
            reason = ?repair,
            "Initializing default knowledge document"
        );
        if let Err(e) = self.save(agent_id, &doc).await {
            error!(
                target: telemetry::ERROR,
                agent = agent_id,
                "Failed to persist default knowledge: {}",
                e
            );
        }
        doc
    }

    /// Persist an agent's document.
    ///
    /// On failure the previous file content is restored and the error is
    /// returned for the caller to log.
    pub async fn save(&self, agent_id: &str, doc: &KnowledgeDocument) -> Result<()> {
        if !Paths::is_safe_id(agent_id) {
            return Err(HiveError::invalid_input(format!(
                "unsafe agent id '{}'",
                agent_id
            )));
        }

        let bytes = serde_json::to_vec_pretty(doc)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            HiveError::storage(format!(
                "Failed to create knowledge dir {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let path = self.path_for(agent_id);
        let backup = DocumentBackup::create(&path).await?;

        match self.writer.write(&path, &bytes).await {
            Ok(()) => {
                debug!(
                    target: telemetry::KNOWLEDGE,
                    agent = agent_id,
                    bytes = bytes.len(),
                    "Knowledge saved"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    target: telemetry::ERROR,
                    agent = agent_id,
                    path = %path.display(),
                    "Knowledge write failed, restoring backup: {}",
                    e
                );
                backup.restore().await?;
                Err(HiveError::storage(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_types::{Task, KNOWLEDGE_KEYS};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Truncates the target file and then reports failure
    struct TruncatingWriter {
        armed: AtomicBool,
    }

    #[async_trait]
    impl DocumentWriter for TruncatingWriter {
        async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
            if self.armed.load(Ordering::SeqCst) {
                tokio::fs::write(path, &bytes[..bytes.len() / 3]).await?;
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                ));
            }
            tokio::fs::write(path, bytes).await
        }
    }

    fn store() -> (KnowledgeStore, TempDir) {
        let temp = TempDir::new().unwrap();
        (KnowledgeStore::new(temp.path().join("knowledge")), temp)
    }

    fn assert_default_on_disk(store: &KnowledgeStore, id: &str) {
        let raw = std::fs::read_to_string(store.path_for(id)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in KNOWLEDGE_KEYS {
            assert!(value.get(key).is_some(), "{} missing on disk", key);
        }
    }

    #[tokio::test]
    async fn test_load_missing_persists_default() {
        let (store, _temp) = store();

        let doc = store.load("overseer").await;
        assert_eq!(doc, KnowledgeDocument::default());
        assert_default_on_disk(&store, "overseer");

        // second load reads the healed file unchanged
        assert_eq!(store.load("overseer").await, KnowledgeDocument::default());
    }

    #[tokio::test]
    async fn test_load_empty_and_corrupt() {
        let (store, _temp) = store();
        std::fs::create_dir_all(store.root()).unwrap();

        std::fs::write(store.path_for("empty"), "   \n").unwrap();
        assert_eq!(store.load("empty").await, KnowledgeDocument::default());
        assert_default_on_disk(&store, "empty");

        std::fs::write(store.path_for("corrupt"), "{\"mechanics\": [1,").unwrap();
        assert_eq!(store.load("corrupt").await, KnowledgeDocument::default());
        assert_default_on_disk(&store, "corrupt");
        assert_eq!(store.load("corrupt").await, KnowledgeDocument::default());
    }

    #[tokio::test]
    async fn test_load_with_missing_key_resets() {
        let (store, _temp) = store();
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(
            store.path_for("lorekeeper"),
            r#"{"mechanics":{"x":1},"lore":{},"projects":{},"tasks":[],"history":[]}"#,
        )
        .unwrap();

        let doc = store.load("lorekeeper").await;
        assert!(doc.mechanics.is_empty());
        assert_default_on_disk(&store, "lorekeeper");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (store, _temp) = store();
        let mut doc = KnowledgeDocument::default();
        doc.lore.insert("harbor".into(), serde_json::json!("salt and rope"));
        doc.record(Task::new("loremaster", "write_lore"));

        store.save("loremaster", &doc).await.unwrap();
        assert_eq!(store.load("loremaster").await, doc);
    }

    #[tokio::test]
    async fn test_failed_write_restores_previous_content() {
        let temp = TempDir::new().unwrap();
        let writer = Arc::new(TruncatingWriter {
            armed: AtomicBool::new(false),
        });
        let store =
            KnowledgeStore::new(temp.path().join("knowledge")).with_writer(writer.clone());

        let mut doc = KnowledgeDocument::default();
        doc.mechanics.insert("hp".into(), serde_json::json!(100));
        store.save("combat", &doc).await.unwrap();
        let before = std::fs::read(store.path_for("combat")).unwrap();

        writer.armed.store(true, Ordering::SeqCst);
        doc.mechanics.insert("mp".into(), serde_json::json!(40));
        assert!(store.save("combat", &doc).await.is_err());

        let after = std::fs::read(store.path_for("combat")).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_failed_first_write_leaves_no_partial_file() {
        let temp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(temp.path().join("knowledge")).with_writer(Arc::new(
            TruncatingWriter {
                armed: AtomicBool::new(true),
            },
        ));

        assert!(store
            .save("social", &KnowledgeDocument::default())
            .await
            .is_err());
        assert!(!store.path_for("social").exists());
    }

    #[tokio::test]
    async fn test_unsafe_id_is_rejected() {
        let (store, _temp) = store();
        assert!(store
            .save("../escape", &KnowledgeDocument::default())
            .await
            .is_err());
        assert_eq!(store.load("../escape").await, KnowledgeDocument::default());
    }
}
