//! # Agent 模块
//!
//! 具名、带 rank 的执行者。每个 Agent 独占一份知识文档（`tokio::sync::Mutex`
//! 保护），首次使用时懒加载，执行完成、接收同伴知识以及关闭时落盘。
//!
//! 执行流程：
//! 1. 依赖门：`depends_on` 未在自身历史中出现 → `Waiting`，无任何副作用
//! 2. 解析 `AgentAction` 并交给 [`Role`] 执行
//! 3. 无论结果如何，追加历史并持久化
//! 4. 完成时把历史条目移交（handoff）给链上的下一个 Agent

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hive_types::{AgentId, Dependency, HistoryEntry, KnowledgeDocument, Task};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::fetch::ResourceFetcher;
use crate::scheduler::TaskSender;
use crate::storage::KnowledgeStore;
use crate::telemetry;

mod action;
mod registry;
pub mod roles;

pub use action::AgentAction;
pub use registry::{AgentRegistry, AgentRegistryBuilder};

/// Task parameter naming the agent that receives the completed history entry
pub const HANDOFF_PARAM: &str = "handoff";

/// Result of one execution that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Completed,
    /// Unknown action name, or an action the addressed role does not handle
    Unsupported { action: String },
    /// Dependency gate closed; the task had no effect
    Waiting { dependency: Dependency },
}

/// What a role did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Done,
    Unsupported,
}

/// Behavior plugged into an [`Agent`]
#[async_trait]
pub trait Role: Send + Sync {
    fn id(&self) -> &str;

    fn rank(&self) -> u32;

    /// Action names this role handles
    fn actions(&self) -> &'static [&'static str];

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled>;
}

/// Shared handles an execution may use
#[derive(Clone)]
pub struct ExecutionEnv {
    pub peers: Arc<AgentRegistry>,
    pub queue: TaskSender,
    pub fetcher: Option<Arc<ResourceFetcher>>,
    /// Upper bound for a fetch made while executing a task
    pub fetch_budget: Duration,
    pub content_threshold: usize,
}

impl ExecutionEnv {
    pub fn new(peers: Arc<AgentRegistry>, queue: TaskSender) -> Self {
        Self {
            peers,
            queue,
            fetcher: None,
            fetch_budget: SchedulerConfig::default().fetch_budget(),
            content_threshold: crate::config::DEFAULT_CONTENT_THRESHOLD,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<ResourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_fetch_budget(mut self, budget: Duration) -> Self {
        self.fetch_budget = budget;
        self
    }

    pub fn with_content_threshold(mut self, threshold: usize) -> Self {
        self.content_threshold = threshold;
        self
    }
}

/// Per-execution view handed to a role
pub struct ActionContext<'a> {
    agent: &'a Agent,
    task: &'a Task,
    knowledge: &'a mut KnowledgeDocument,
    env: &'a ExecutionEnv,
    handoffs: Vec<AgentId>,
}

impl<'a> ActionContext<'a> {
    pub fn agent_id(&self) -> &str {
        &self.agent.id
    }

    pub fn task(&self) -> &Task {
        self.task
    }

    pub fn knowledge(&mut self) -> &mut KnowledgeDocument {
        self.knowledge
    }

    pub fn env(&self) -> &ExecutionEnv {
        self.env
    }

    pub fn fetcher(&self) -> Option<&ResourceFetcher> {
        self.env.fetcher.as_deref()
    }

    pub fn rank_of(&self, agent_id: &str) -> Option<u32> {
        self.env.peers.rank_of(agent_id)
    }

    pub fn is_registered(&self, agent_id: &str) -> bool {
        self.env.peers.get(agent_id).is_some()
    }

    pub fn enqueue(&self, task: Task) -> Result<()> {
        self.env.queue.enqueue(task)
    }

    /// Enqueue tasks as one unit: the scheduler sees all of them or none
    pub fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<()> {
        self.env.queue.enqueue_batch(tasks)
    }

    /// Copy a fragment into a peer's `lore` map.
    ///
    /// Returns `false` when the peer is not registered.
    pub async fn share_lore(&mut self, peer: &str, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if peer == self.agent.id {
            self.knowledge.lore.insert(key, value);
            return true;
        }

        match self.env.peers.get(peer) {
            Some(agent) => {
                agent.receive_lore(&self.agent.id, key, value).await;
                true
            }
            None => {
                warn!(
                    target: telemetry::KNOWLEDGE,
                    from = %self.agent.id,
                    to = peer,
                    "Lore transfer skipped, peer not registered"
                );
                false
            }
        }
    }

    /// Hand the completed history entry for this task to `peer`
    pub fn handoff_to(&mut self, peer: impl Into<AgentId>) {
        let peer = peer.into();
        if !self.handoffs.contains(&peer) {
            self.handoffs.push(peer);
        }
    }
}

pub struct Agent {
    id: AgentId,
    rank: u32,
    active: AtomicBool,
    knowledge: Mutex<Option<KnowledgeDocument>>,
    store: Arc<KnowledgeStore>,
    role: Box<dyn Role>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("rank", &self.rank)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Agent {
    pub fn new(role: Box<dyn Role>, store: Arc<KnowledgeStore>) -> Self {
        Self {
            id: role.id().to_string(),
            rank: role.rank(),
            active: AtomicBool::new(true),
            knowledge: Mutex::new(None),
            store,
            role,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn actions(&self) -> &'static [&'static str] {
        self.role.actions()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    async fn loaded<'g>(&self, slot: &'g mut Option<KnowledgeDocument>) -> &'g mut KnowledgeDocument {
        if slot.is_none() {
            *slot = Some(self.store.load(&self.id).await);
        }
        slot.get_or_insert_with(KnowledgeDocument::default)
    }

    async fn persist(&self, doc: &KnowledgeDocument) {
        if let Err(e) = self.store.save(&self.id, doc).await {
            error!(
                target: telemetry::ERROR,
                agent = %self.id,
                kind = e.kind(),
                "Failed to persist knowledge: {}",
                e
            );
        }
    }

    /// Execute one task addressed to this agent.
    pub async fn execute(&self, task: &Task, env: &ExecutionEnv) -> Result<ExecutionOutcome> {
        let mut slot = self.knowledge.lock().await;
        let knowledge = self.loaded(&mut slot).await;

        if let Some(dependency) = &task.depends_on {
            if !knowledge.has_completed(dependency) {
                info!(
                    target: telemetry::TASK,
                    agent = %self.id,
                    task = %task.label(),
                    dependency = %dependency,
                    "Waiting on unmet dependency, task dropped"
                );
                return Ok(ExecutionOutcome::Waiting {
                    dependency: dependency.clone(),
                });
            }
        }

        debug!(target: telemetry::TASK, agent = %self.id, task = %task.label(), "Executing");

        let mut ctx = ActionContext {
            agent: self,
            task,
            knowledge: &mut *knowledge,
            env,
            handoffs: Vec::new(),
        };
        if let Some(peer) = task.param_str(HANDOFF_PARAM) {
            ctx.handoff_to(peer);
        }

        let result = match AgentAction::parse(&task.action, &task.parameters) {
            Ok(Some(action)) => self.role.perform(action, &mut ctx).await,
            Ok(None) => Ok(Handled::Unsupported),
            Err(e) => Err(e),
        };
        let handoffs = ctx.handoffs;

        // 历史总是追加，失败与不支持的动作也一样
        knowledge.record(task.clone());
        self.persist(knowledge).await;

        match result? {
            Handled::Unsupported => Ok(ExecutionOutcome::Unsupported {
                action: task.action.clone(),
            }),
            Handled::Done => {
                let entry = knowledge.history.last().cloned();
                drop(slot);

                if let Some(entry) = entry {
                    for peer in handoffs.iter().filter(|peer| **peer != self.id) {
                        match env.peers.get(peer) {
                            Some(agent) => agent.acknowledge(entry.clone()).await,
                            None => warn!(
                                target: telemetry::TASK,
                                agent = %self.id,
                                peer = %peer,
                                "Handoff target not registered"
                            ),
                        }
                    }
                }
                Ok(ExecutionOutcome::Completed)
            }
        }
    }

    /// Accept a knowledge fragment from a peer
    pub async fn receive_lore(&self, from: &str, key: String, value: Value) {
        let mut slot = self.knowledge.lock().await;
        let knowledge = self.loaded(&mut slot).await;

        debug!(
            target: telemetry::KNOWLEDGE,
            from,
            to = %self.id,
            key = %key,
            "Lore received"
        );
        knowledge.lore.insert(key, value);
        self.persist(knowledge).await;
    }

    /// Record a peer's completed history entry as if observed locally
    pub async fn acknowledge(&self, entry: HistoryEntry) {
        let mut slot = self.knowledge.lock().await;
        let knowledge = self.loaded(&mut slot).await;

        debug!(
            target: telemetry::KNOWLEDGE,
            to = %self.id,
            task = %entry.task.label(),
            "Handoff received"
        );
        knowledge.history.push(entry);
        self.persist(knowledge).await;
    }

    /// Persist the in-memory document, if it has been loaded
    pub async fn flush(&self) -> Result<()> {
        let slot = self.knowledge.lock().await;
        match slot.as_ref() {
            Some(doc) => self.store.save(&self.id, doc).await,
            None => Ok(()),
        }
    }

    /// History length without waiting; `None` while busy or not yet loaded
    pub fn history_len(&self) -> Option<usize> {
        self.knowledge
            .try_lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|doc| doc.history.len()))
    }

    /// Copy of the current document (loads it on first use)
    pub async fn snapshot(&self) -> KnowledgeDocument {
        let mut slot = self.knowledge.lock().await;
        self.loaded(&mut slot).await.clone()
    }

    /// Replace the document with the schema default and persist it
    pub async fn reset(&self) -> Result<()> {
        let mut slot = self.knowledge.lock().await;
        let doc = KnowledgeDocument::default();
        self.store.save(&self.id, &doc).await?;
        *slot = Some(doc);
        info!(target: telemetry::KNOWLEDGE, agent = %self.id, "Knowledge reset");
        Ok(())
    }
}
