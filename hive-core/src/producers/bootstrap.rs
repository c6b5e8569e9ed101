//! Startup seed tasks

use hive_types::Task;
use tracing::info;

use crate::agent::roles::{gatekeeper, overseer, protocol, social};
use crate::error::Result;
use crate::scheduler::TaskSender;
use crate::telemetry;

/// The fixed seed sequence, planner first
pub fn seed_tasks(objective: &str) -> Vec<Task> {
    vec![
        Task::new(overseer::ID, "plan").with_param("objective", objective),
        Task::new(gatekeeper::ID, "design_login"),
        Task::new(protocol::ID, "negotiate_protocol"),
        Task::new(social::ID, "create_emote"),
    ]
}

/// Enqueue the seed sequence once
pub fn bootstrap(sender: &TaskSender, objective: &str) -> Result<usize> {
    let tasks = seed_tasks(objective);
    let count = tasks.len();
    for task in tasks {
        sender.enqueue(task)?;
    }
    info!(target: telemetry::TASK, objective, count, "Bootstrap tasks enqueued");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_sequence() {
        let (sender, mut rx) = TaskSender::channel();
        assert_eq!(bootstrap(&sender, "expand_x").unwrap(), 4);

        let mut labels = Vec::new();
        while let Ok(submission) = rx.try_recv() {
            for task in submission.into_tasks() {
                labels.push(format!("{}.{}", task.target_agent, task.action));
                if task.action == "plan" {
                    assert_eq!(task.param_str("objective"), Some("expand_x"));
                }
            }
        }
        assert_eq!(
            labels,
            [
                "overseer.plan",
                "gatekeeper.design_login",
                "protocol.negotiate_protocol",
                "social.create_emote",
            ]
        );
    }

    #[test]
    fn test_bootstrap_on_closed_channel_fails() {
        let (sender, rx) = TaskSender::channel();
        drop(rx);
        assert!(bootstrap(&sender, "expand_x").is_err());
    }
}
