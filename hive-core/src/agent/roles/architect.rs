use async_trait::async_trait;
use serde_json::{json, Value};

use super::{now, pick};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "architect";
pub const RANK: u32 = 9;

const ATTRIBUTES: [&str; 6] = [
    "strength",
    "dexterity",
    "constitution",
    "intellect",
    "wisdom",
    "presence",
];

const RESOLUTION: [&str; 3] = ["d20 + modifier vs difficulty", "2d6 + skill", "percentile under skill"];

/// Game-rules designer
pub struct Architect;

fn infer_system(objective: &str) -> &'static str {
    let lowered = objective.to_lowercase();
    let rules: [(&[&str], &str); 4] = [
        (&["combat", "fight", "battle"], "combat"),
        (&["magic", "spell", "mana"], "magic"),
        (&["trade", "economy", "shop"], "economy"),
        (&["craft", "forge", "recipe"], "crafting"),
    ];
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, system)| *system)
        .unwrap_or("core")
}

fn design(objective: &str, system: &str) -> Value {
    let primary = pick(objective, &ATTRIBUTES);
    let secondary = pick(&format!("{}:{}", system, objective), &ATTRIBUTES);
    json!({
        "objective": objective,
        "system": system,
        "attributes": ATTRIBUTES,
        "primary_attribute": primary,
        "secondary_attribute": secondary,
        "resolution": pick(system, &RESOLUTION),
        "revision": 1,
        "designed_at": now(),
    })
}

#[async_trait]
impl Role for Architect {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["design_mechanics", "refine_mechanics"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::DesignMechanics { objective, system } => {
                let system = system.unwrap_or_else(|| infer_system(&objective).to_string());
                let sheet = design(&objective, &system);
                let summary = format!(
                    "{} rules for {}: {} resolves checks",
                    system, objective, sheet["resolution"].as_str().unwrap_or("d20")
                );
                ctx.knowledge().mechanics.insert(system.clone(), sheet);
                ctx.share_lore(
                    "loremaster",
                    format!("mechanics:{}", system),
                    json!({ "objective": objective, "summary": summary }),
                )
                .await;
                Ok(Handled::Done)
            }
            AgentAction::RefineMechanics { objective } => {
                let mechanics = &mut ctx.knowledge().mechanics;
                let existing = mechanics
                    .values_mut()
                    .filter_map(Value::as_object_mut)
                    .find(|sheet| {
                        sheet.get("objective").and_then(Value::as_str) == Some(objective.as_str())
                    });

                match existing {
                    Some(sheet) => {
                        let revision = sheet.get("revision").and_then(Value::as_u64).unwrap_or(1) + 1;
                        sheet.insert("revision".into(), json!(revision));
                        sheet.insert("refined_at".into(), json!(now()));
                    }
                    None => {
                        let system = infer_system(&objective);
                        mechanics.insert(system.to_string(), design(&objective, system));
                    }
                }
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}
