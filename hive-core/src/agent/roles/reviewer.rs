use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;

use super::{now, slug};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "reviewer";
pub const RANK: u32 = 1;

/// Final quality gate of a plan chain
pub struct Reviewer;

#[async_trait]
impl Role for Reviewer {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["review", "audit"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        let own_id = ctx.agent_id().to_string();
        match action {
            AgentAction::Review { objective } => {
                let knowledge = ctx.knowledge();
                // handed-off entries from earlier chain steps for this objective
                let contributors: Vec<String> = knowledge
                    .history
                    .iter()
                    .filter(|entry| entry.task.target_agent != own_id)
                    .filter(|entry| entry.task.param_str("objective") == Some(objective.as_str()))
                    .map(|entry| format!("{}.{}", entry.task.target_agent, entry.task.action))
                    .collect();
                let verdict = if contributors.is_empty() {
                    "needs_work"
                } else {
                    "approved"
                };

                knowledge.projects.insert(
                    format!("review:{}", slug(&objective)),
                    json!({
                        "objective": objective,
                        "verdict": verdict,
                        "contributors": contributors,
                        "reviewed_at": now(),
                    }),
                );
                Ok(Handled::Done)
            }
            AgentAction::Audit {} => {
                let knowledge = ctx.knowledge();
                let mut by_action: BTreeMap<String, usize> = BTreeMap::new();
                for entry in &knowledge.history {
                    *by_action
                        .entry(format!("{}.{}", entry.task.target_agent, entry.task.action))
                        .or_default() += 1;
                }
                let reviews = knowledge
                    .projects
                    .keys()
                    .filter(|key| key.starts_with("review:"))
                    .count();

                knowledge.projects.insert(
                    "audit".into(),
                    json!({
                        "history_entries": knowledge.history.len(),
                        "reviews": reviews,
                        "by_action": by_action,
                        "audited_at": now(),
                    }),
                );
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}
