//! 端到端编排测试
//!
//! 标准十角色注册表 + 调度器，运行到静止后检查各 agent 的知识文档。

use std::sync::Arc;
use std::time::Duration;

use hive_core::agent::roles::plan_steps;
use hive_core::{
    AgentRegistry, Dependency, ExecutionEnv, HistoryEntry, KnowledgeStore, Scheduler, Task,
    TaskSender,
};
use tempfile::TempDir;

struct Fixture {
    scheduler: Scheduler,
    sender: TaskSender,
    registry: Arc<AgentRegistry>,
    _temp: TempDir,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(KnowledgeStore::in_data_dir(temp.path()));
    let registry = Arc::new(AgentRegistry::standard(store).unwrap());
    let (sender, inbox) = TaskSender::channel();
    let env = ExecutionEnv::new(registry.clone(), sender.clone());
    Fixture {
        scheduler: Scheduler::new(env, inbox, Duration::from_secs(30)),
        sender,
        registry,
        _temp: temp,
    }
}

/// Entries the agent executed itself (handoff copies excluded)
async fn own_entries(registry: &AgentRegistry, id: &str, action: &str) -> Vec<HistoryEntry> {
    registry
        .get(id)
        .unwrap()
        .snapshot()
        .await
        .history
        .into_iter()
        .filter(|entry| entry.task.target_agent == id && entry.task.action == action)
        .collect()
}

#[tokio::test]
async fn test_plan_chain_runs_in_dependency_order() {
    let mut f = fixture();
    f.sender
        .enqueue(Task::new("overseer", "plan").with_param("objective", "expand_x"))
        .unwrap();

    let stats = f.scheduler.run_until_idle().await;
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.waiting, 0);

    let mut steps: Vec<(&str, &str, u32)> = plan_steps("expand_x")
        .into_iter()
        .map(|(agent, action)| (agent, action, f.registry.rank_of(agent).unwrap()))
        .collect();
    steps.sort_by(|a, b| b.2.cmp(&a.2));
    assert_eq!(stats.completed as usize, steps.len() + 1);

    let mut previous = Dependency::on("overseer", "plan");
    let mut previous_at = own_entries(&f.registry, "overseer", "plan").await[0].timestamp;

    for (agent, action, _) in steps {
        let entries = own_entries(&f.registry, agent, action).await;
        assert_eq!(entries.len(), 1, "{}.{} should run exactly once", agent, action);

        let entry = &entries[0];
        assert_eq!(entry.task.depends_on.as_ref(), Some(&previous));
        assert_eq!(entry.task.param_str("objective"), Some("expand_x"));
        assert!(entry.timestamp >= previous_at);

        previous = Dependency::on(agent, action);
        previous_at = entry.timestamp;
    }
}

#[tokio::test]
async fn test_unmet_dependency_has_no_effect_until_satisfied() {
    let mut f = fixture();
    let gated = Task::new("builder", "build_area")
        .with_param("objective", "harbor")
        .with_dependency(Dependency::action("plan"));

    f.sender.enqueue(gated.clone()).unwrap();
    let stats = f.scheduler.run_until_idle().await;
    assert_eq!(stats.waiting, 1);
    assert!(own_entries(&f.registry, "builder", "build_area").await.is_empty());

    // a plan handed off to the builder satisfies the gate
    f.registry
        .get("builder")
        .unwrap()
        .acknowledge(HistoryEntry::now(Task::new("overseer", "plan")))
        .await;
    f.sender.enqueue(gated).unwrap();
    let stats = f.scheduler.run_until_idle().await;
    assert_eq!(stats.completed, 1);
    assert_eq!(own_entries(&f.registry, "builder", "build_area").await.len(), 1);
}

#[tokio::test]
async fn test_large_content_is_amplified_ahead_of_queue() {
    let mut f = fixture();
    let content = "tidal ".repeat(600);

    f.sender
        .enqueue(
            Task::new("archivist", "process_content")
                .with_param("source", "https://mud.test/lore")
                .with_param("content", content)
                .with_param("category", "lore"),
        )
        .unwrap();

    let stats = f.scheduler.run_until_idle().await;
    assert_eq!(stats.failed, 0);
    assert_eq!(own_entries(&f.registry, "archivist", "deep_process").await.len(), 1);

    let loremaster = f.registry.get("loremaster").unwrap().snapshot().await;
    assert!(loremaster.lore.contains_key("archive:https://mud.test/lore"));
}

#[tokio::test]
async fn test_knowledge_survives_restart() {
    let temp = TempDir::new().unwrap();
    {
        let store = Arc::new(KnowledgeStore::in_data_dir(temp.path()));
        let registry = Arc::new(AgentRegistry::standard(store).unwrap());
        let (sender, inbox) = TaskSender::channel();
        let mut scheduler =
            Scheduler::new(ExecutionEnv::new(registry.clone(), sender.clone()), inbox, Duration::from_secs(30));
        sender
            .enqueue(Task::new("social", "create_emote").with_param("name", "wave"))
            .unwrap();
        scheduler.run_until_idle().await;
        assert_eq!(registry.flush_all().await, 0);
    }

    let store = Arc::new(KnowledgeStore::in_data_dir(temp.path()));
    let registry = AgentRegistry::standard(store).unwrap();
    let doc = registry.get("social").unwrap().snapshot().await;
    assert_eq!(doc.count_action("create_emote"), 1);
}
