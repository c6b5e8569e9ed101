//! Overseer: decomposes objectives into dependent sub-task chains.

use async_trait::async_trait;
use hive_types::{Dependency, Task};
use serde_json::json;
use tracing::info;

use super::now;
use crate::agent::{ActionContext, AgentAction, Handled, Role, HANDOFF_PARAM};
use crate::error::Result;
use crate::telemetry;

pub const ID: &str = "overseer";
pub const RANK: u32 = 10;

/// Steps every plan contains
const BASE_CHAIN: [(&str, &str); 5] = [
    ("architect", "design_mechanics"),
    ("loremaster", "write_lore"),
    ("combat", "balance_combat"),
    ("builder", "build_area"),
    ("reviewer", "review"),
];

/// Steps added when the objective mentions one of the keywords
const KEYWORD_STEPS: [(&[&str], &str, &str); 3] = [
    (&["login", "account"], "gatekeeper", "design_login"),
    (&["social", "chat", "emote"], "social", "design_channel"),
    (&["protocol", "telnet", "network"], "protocol", "negotiate_protocol"),
];

pub struct Overseer;

/// Candidate `(agent, action)` steps for an objective, unordered
pub fn plan_steps(objective: &str) -> Vec<(&'static str, &'static str)> {
    let lowered = objective.to_lowercase();
    let mut steps = BASE_CHAIN.to_vec();
    for (keywords, agent, action) in KEYWORD_STEPS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            steps.push((agent, action));
        }
    }
    steps
}

#[async_trait]
impl Role for Overseer {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["plan"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        let AgentAction::Plan { objective } = action else {
            return Ok(Handled::Unsupported);
        };

        // 按 rank 降序排列，使调度顺序与依赖顺序一致
        let mut steps: Vec<(&str, &str, u32)> = plan_steps(&objective)
            .into_iter()
            .filter_map(|(agent, action)| ctx.rank_of(agent).map(|rank| (agent, action, rank)))
            .collect();
        steps.sort_by(|a, b| b.2.cmp(&a.2));

        let mut tasks = Vec::with_capacity(steps.len());
        for (i, (agent, action, _)) in steps.iter().enumerate() {
            let dependency = match i {
                0 => Dependency::on(ctx.agent_id(), "plan"),
                _ => Dependency::on(steps[i - 1].0, steps[i - 1].1),
            };
            let mut task = Task::new(*agent, *action)
                .with_param("objective", objective.clone())
                .with_dependency(dependency);
            if let Some((next, _, _)) = steps.get(i + 1) {
                task = task.with_param(HANDOFF_PARAM, *next);
            }
            tasks.push(task);
        }

        let labels: Vec<String> = steps
            .iter()
            .map(|(agent, action, _)| format!("{}.{}", agent, action))
            .collect();
        let records: Vec<_> = tasks
            .iter()
            .map(|task| {
                json!({
                    "id": task.id,
                    "agent": task.target_agent,
                    "action": task.action,
                    "objective": objective,
                    "depends_on": task.depends_on.as_ref().map(|d| d.to_string()),
                })
            })
            .collect();

        if let Some((first, _, _)) = steps.first() {
            ctx.enqueue_batch(tasks)?;
            ctx.handoff_to(*first);
        }

        info!(
            target: telemetry::TASK,
            objective = %objective,
            steps = labels.len(),
            "Plan enqueued"
        );

        let knowledge = ctx.knowledge();
        knowledge.projects.insert(
            objective.clone(),
            json!({
                "status": "planned",
                "steps": labels,
                "planned_at": now(),
            }),
        );
        knowledge.tasks.extend(records);

        Ok(Handled::Done)
    }
}
