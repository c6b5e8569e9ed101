use async_trait::async_trait;
use serde_json::json;

use super::now;
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "gatekeeper";
pub const RANK: u32 = 3;

const LOGIN_STEPS: [&str; 6] = [
    "greeting",
    "ask_name",
    "ask_password",
    "motd",
    "reconnect_check",
    "enter_world",
];

const CREATION_STEPS: [&str; 5] = ["name", "race", "class", "attributes", "confirm"];

const RACES: [&str; 4] = ["human", "elf", "dwarf", "halfling"];
const CLASSES: [&str; 4] = ["warrior", "mage", "thief", "cleric"];

/// Login and character-creation flows
pub struct Gatekeeper;

#[async_trait]
impl Role for Gatekeeper {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["design_login", "design_character_creation"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        let flow = match action {
            AgentAction::DesignLogin { objective } => (
                "login",
                json!({
                    "objective": objective,
                    "steps": LOGIN_STEPS,
                    "max_password_attempts": 3,
                    "lockout_secs": 300,
                    "idle_timeout_secs": 120,
                    "name_rules": { "min_len": 3, "max_len": 16, "alphabetic_only": true },
                    "designed_at": now(),
                }),
            ),
            AgentAction::DesignCharacterCreation { objective } => (
                "character_creation",
                json!({
                    "objective": objective,
                    "steps": CREATION_STEPS,
                    "races": RACES,
                    "classes": CLASSES,
                    "attribute_points": 27,
                    "attribute_range": [8, 18],
                    "designed_at": now(),
                }),
            ),
            _ => return Ok(Handled::Unsupported),
        };

        let (key, design) = flow;
        ctx.knowledge().mechanics.insert(key.to_string(), design);
        Ok(Handled::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::roles::testing::Harness;
    use crate::agent::ExecutionOutcome;
    use hive_types::Task;

    #[tokio::test]
    async fn test_login_and_creation_flows() {
        let h = Harness::new();
        assert_eq!(
            h.run(Task::new(ID, "design_login")).await.unwrap(),
            ExecutionOutcome::Completed
        );
        h.run(Task::new(ID, "design_character_creation").with_param("objective", "new players"))
            .await
            .unwrap();

        let doc = h.doc(ID).await;
        assert_eq!(doc.mechanics["login"]["steps"][0], json!("greeting"));
        assert_eq!(doc.mechanics["login"]["objective"], json!(null));
        assert_eq!(
            doc.mechanics["character_creation"]["objective"],
            json!("new players")
        );
    }

    #[tokio::test]
    async fn test_foreign_action_is_unsupported() {
        let h = Harness::new();
        let outcome = h
            .run(Task::new(ID, "write_lore").with_param("objective", "x"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Unsupported {
                action: "write_lore".into()
            }
        );
        assert_eq!(h.doc(ID).await.history.len(), 1);
    }
}
