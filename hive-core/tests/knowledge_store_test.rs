//! 知识文档持久化测试：自愈读取与失败写入恢复

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use hive_core::storage::{DocumentWriter, KnowledgeStore};
use hive_core::{KnowledgeDocument, Task, KNOWLEDGE_KEYS};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Writes nothing and reports a full disk
struct FullDisk;

#[async_trait]
impl DocumentWriter for FullDisk {
    async fn write(&self, _path: &Path, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
    }
}

async fn assert_default_on_disk(store: &KnowledgeStore, id: &str) {
    let raw = tokio::fs::read_to_string(store.path_for(id)).await.unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    for key in KNOWLEDGE_KEYS {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
}

#[tokio::test]
async fn test_every_broken_shape_heals_to_default() {
    let temp = TempDir::new().unwrap();
    let store = KnowledgeStore::new(temp.path().join("knowledge"));
    tokio::fs::create_dir_all(store.root()).await.unwrap();

    let shapes = [
        ("empty", "".to_string()),
        ("whitespace", "  \n".to_string()),
        ("garbage", "{not json".to_string()),
        ("array", "[]".to_string()),
        (
            "five_keys",
            json!({"mechanics": {}, "lore": {}, "projects": {}, "tasks": [], "history": []})
                .to_string(),
        ),
    ];
    for (id, body) in &shapes {
        tokio::fs::write(store.path_for(id), body).await.unwrap();
    }

    for (id, _) in &shapes {
        let doc = store.load(id).await;
        assert_eq!(doc, KnowledgeDocument::default(), "{}", id);
        assert_default_on_disk(&store, id).await;
        // 第二次读取得到同一个默认文档
        assert_eq!(store.load(id).await, KnowledgeDocument::default());
    }

    let missing = store.load("never_written").await;
    assert!(missing.is_empty());
    assert_default_on_disk(&store, "never_written").await;
}

#[tokio::test]
async fn test_failed_save_keeps_previous_content() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("knowledge");

    let good = KnowledgeStore::new(&root);
    let mut doc = KnowledgeDocument::default();
    doc.record(Task::new("builder", "build_area"));
    good.save("builder", &doc).await.unwrap();
    let before = tokio::fs::read(good.path_for("builder")).await.unwrap();

    let failing = KnowledgeStore::new(&root).with_writer(Arc::new(FullDisk));
    doc.record(Task::new("builder", "populate_area"));
    assert!(failing.save("builder", &doc).await.is_err());

    let after = tokio::fs::read(good.path_for("builder")).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(good.load("builder").await.history.len(), 1);
}

#[tokio::test]
async fn test_unsafe_ids_are_rejected() {
    let temp = TempDir::new().unwrap();
    let store = KnowledgeStore::new(temp.path().join("knowledge"));

    let result = store.save("../escape", &KnowledgeDocument::default()).await;
    assert!(result.is_err());
    assert!(!temp.path().join("escape.json").exists());
}
