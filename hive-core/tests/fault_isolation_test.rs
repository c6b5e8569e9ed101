//! 故障隔离测试
//!
//! 一个慢 URL 或一条旧格式的知识条目，只影响它自己的任务；同一 agent
//! 队列里后面的任务照常执行。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hive_core::config::FetchConfig;
use hive_core::fetch::{HttpResponse, HttpTransport};
use hive_core::{
    AgentRegistry, ExecutionEnv, KnowledgeStore, ResourceFetcher, Result, Scheduler, Task,
    TaskSender,
};
use tempfile::TempDir;

const TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Never answers
struct Hanging;

#[async_trait]
impl HttpTransport for Hanging {
    async fn get(&self, _url: &str) -> Result<HttpResponse> {
        std::future::pending().await
    }
}

fn setup(temp: &TempDir, fetch_budget: Duration) -> (Scheduler, TaskSender, Arc<AgentRegistry>) {
    let store = Arc::new(KnowledgeStore::in_data_dir(temp.path()));
    let registry = Arc::new(AgentRegistry::standard(store).unwrap());
    let fetcher = Arc::new(ResourceFetcher::with_transport(
        FetchConfig::default(),
        Arc::new(Hanging),
    ));
    let (sender, inbox) = TaskSender::channel();
    let env = ExecutionEnv::new(registry.clone(), sender.clone())
        .with_fetcher(fetcher)
        .with_fetch_budget(fetch_budget);
    (Scheduler::new(env, inbox, TASK_TIMEOUT), sender, registry)
}

fn ingest_then_process(sender: &TaskSender) {
    sender
        .enqueue(Task::new("archivist", "ingest_url").with_param("url", "http://slow.test/"))
        .unwrap();
    sender
        .enqueue(
            Task::new("archivist", "process_content")
                .with_param("source", "http://fast.test/")
                .with_param("content", "a short tale of the harbor"),
        )
        .unwrap();
}

async fn archivist_actions(registry: &AgentRegistry) -> Vec<String> {
    registry
        .get("archivist")
        .unwrap()
        .snapshot()
        .await
        .history
        .into_iter()
        .map(|entry| entry.task.action)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_slow_url_fails_within_budget_and_queue_continues() {
    let temp = TempDir::new().unwrap();
    let (mut scheduler, sender, registry) = setup(&temp, TASK_TIMEOUT * 4 / 5);
    ingest_then_process(&sender);

    let started = tokio::time::Instant::now();
    let stats = scheduler.run_until_idle().await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.timed_out, 0);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.dropped, 0);
    assert!(started.elapsed() < TASK_TIMEOUT);
    assert!(registry.get("archivist").unwrap().is_active());
    assert_eq!(
        archivist_actions(&registry).await,
        ["ingest_url", "process_content"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_task_does_not_take_agent_offline() {
    let temp = TempDir::new().unwrap();
    let (mut scheduler, sender, registry) = setup(&temp, Duration::from_secs(3600));
    ingest_then_process(&sender);

    let stats = scheduler.run_until_idle().await;

    assert_eq!(stats.timed_out, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.dropped, 0);
    assert!(registry.get("archivist").unwrap().is_active());
    assert_eq!(archivist_actions(&registry).await, ["process_content"]);
}

#[tokio::test]
async fn test_legacy_project_entry_fails_without_panicking() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("knowledge");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("archivist.json"),
        r#"{"mechanics":{},"lore":{},"projects":{"src":"legacy"},"tasks":[],"history":[],"embeddings":{}}"#,
    )
    .unwrap();

    let (mut scheduler, sender, registry) = setup(&temp, TASK_TIMEOUT);
    sender
        .enqueue(Task::new("archivist", "deep_process").with_param("source", "src"))
        .unwrap();
    sender
        .enqueue(
            Task::new("archivist", "process_content")
                .with_param("source", "fresh")
                .with_param("content", "new material"),
        )
        .unwrap();

    let stats = scheduler.run_until_idle().await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.dropped, 0);
    assert!(registry.get("archivist").unwrap().is_active());
    assert!(registry
        .get("archivist")
        .unwrap()
        .snapshot()
        .await
        .projects
        .contains_key("fresh"));
}
