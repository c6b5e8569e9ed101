//! # Hive Scheduler
//!
//! Single consumer of a multi-producer task channel.
//!
//! ## Loop
//!
//! ```text
//! producers ──TaskSender──▶ mpsc ──drain──▶ TaskQueue ──pop_next(rank)──▶ Agent::execute
//!                                                                           │
//!                                       timeout + catch_unwind ◀────────────┘
//! ```
//!
//! - The channel is drained into the queue before every dequeue.
//! - Each execution is bounded by `task_timeout`. A timed-out task is
//!   abandoned, the agent keeps serving the rest of its queue.
//! - A panicking agent is marked inactive until the health monitor
//!   reactivates it.
//! - Tasks for unknown or inactive agents are logged and dropped.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use hive_types::Task;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::agent::{ExecutionEnv, ExecutionOutcome};
use crate::error::{HiveError, Result};
use crate::runtime::ShutdownSignal;
use crate::telemetry;

mod queue;

pub use queue::TaskQueue;

/// One channel message; a batch is always queued as a unit
#[derive(Debug)]
pub enum Submission {
    Single(Task),
    Batch(Vec<Task>),
}

impl Submission {
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Single(task) => vec![task],
            Self::Batch(tasks) => tasks,
        }
    }
}

/// Cloneable submission handle
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: mpsc::UnboundedSender<Submission>,
}

impl TaskSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Submission>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, task: Task) -> Result<()> {
        debug!(target: telemetry::TASK, task = %task.label(), "Enqueued");
        self.tx
            .send(Submission::Single(task))
            .map_err(|_| HiveError::QueueClosed)
    }

    pub fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        debug!(target: telemetry::TASK, size = tasks.len(), "Batch enqueued");
        self.tx
            .send(Submission::Batch(tasks))
            .map_err(|_| HiveError::QueueClosed)
    }
}

/// Execution counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub dispatched: u64,
    pub completed: u64,
    pub unsupported: u64,
    pub waiting: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub dropped: u64,
}

pub struct Scheduler {
    env: ExecutionEnv,
    inbox: mpsc::UnboundedReceiver<Submission>,
    queue: TaskQueue,
    task_timeout: Duration,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new(
        env: ExecutionEnv,
        inbox: mpsc::UnboundedReceiver<Submission>,
        task_timeout: Duration,
    ) -> Self {
        Self {
            env,
            inbox,
            queue: TaskQueue::new(),
            task_timeout,
            stats: SchedulerStats::default(),
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn env(&self) -> &ExecutionEnv {
        &self.env
    }

    fn accept(&mut self, submission: Submission) {
        match submission {
            Submission::Single(task) => self.queue.push(task),
            Submission::Batch(tasks) => self.queue.push_batch(tasks),
        }
    }

    /// Move everything waiting in the channel into the queue
    fn drain(&mut self) {
        while let Ok(submission) = self.inbox.try_recv() {
            self.accept(submission);
        }
    }

    fn next_task(&mut self) -> Option<Task> {
        self.drain();
        let peers = &self.env.peers;
        self.queue.pop_next(|id| peers.rank_of(id))
    }

    /// Run until shutdown is signalled.
    ///
    /// The execution env holds a sender of its own, so the channel never
    /// closes underneath a running scheduler.
    pub async fn run(&mut self, mut shutdown: ShutdownSignal) -> SchedulerStats {
        info!(
            target: telemetry::TASK,
            timeout_secs = self.task_timeout.as_secs(),
            "Scheduler started"
        );

        while !shutdown.is_triggered() {
            match self.next_task() {
                Some(task) => self.dispatch(task).await,
                None => {
                    tokio::select! {
                        received = self.inbox.recv() => match received {
                            Some(submission) => self.accept(submission),
                            None => break,
                        },
                        _ = shutdown.wait() => break,
                    }
                }
            }
            tokio::task::yield_now().await;
        }

        let abandoned = self.queue.clear();
        info!(
            target: telemetry::TASK,
            abandoned,
            stats = ?self.stats,
            "Scheduler stopped"
        );
        self.stats
    }

    /// Dispatch until both the queue and the channel are empty
    pub async fn run_until_idle(&mut self) -> SchedulerStats {
        while let Some(task) = self.next_task() {
            self.dispatch(task).await;
            tokio::task::yield_now().await;
        }
        debug!(target: telemetry::TASK, stats = ?self.stats, "Scheduler idle");
        self.stats
    }

    async fn dispatch(&mut self, task: Task) {
        self.stats.dispatched += 1;
        let label = task.label();

        let Some(agent) = self.env.peers.get(&task.target_agent).cloned() else {
            warn!(
                target: telemetry::TASK,
                task = %label,
                "Unknown agent, task dropped"
            );
            self.stats.dropped += 1;
            return;
        };

        if !agent.is_active() {
            warn!(
                target: telemetry::TASK,
                task = %label,
                "Agent inactive, task dropped"
            );
            self.stats.dropped += 1;
            return;
        }

        info!(target: telemetry::TASK, task = %label, rank = agent.rank(), "Task started");

        let execution = AssertUnwindSafe(agent.execute(&task, &self.env)).catch_unwind();
        match tokio::time::timeout(self.task_timeout, execution).await {
            Ok(Ok(Ok(outcome))) => match outcome {
                ExecutionOutcome::Completed => {
                    self.stats.completed += 1;
                    info!(target: telemetry::TASK, task = %label, "Task completed");
                }
                ExecutionOutcome::Unsupported { action } => {
                    self.stats.unsupported += 1;
                    warn!(
                        target: telemetry::TASK,
                        task = %label,
                        action = %action,
                        "Task unsupported"
                    );
                }
                ExecutionOutcome::Waiting { .. } => {
                    self.stats.waiting += 1;
                }
            },
            Ok(Ok(Err(e))) => {
                self.stats.failed += 1;
                error!(
                    target: telemetry::ERROR,
                    task = %label,
                    kind = e.kind(),
                    "Task failed: {}",
                    e
                );
            }
            Ok(Err(panic)) => {
                self.stats.failed += 1;
                agent.set_active(false);
                error!(
                    target: telemetry::ERROR,
                    task = %label,
                    "Task panicked, agent deactivated: {}",
                    panic_message(panic.as_ref())
                );
            }
            Err(_) => {
                self.stats.timed_out += 1;
                let err = HiveError::Timeout(self.task_timeout.as_secs());
                error!(
                    target: telemetry::ERROR,
                    task = %label,
                    "Task abandoned: {}",
                    err
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
