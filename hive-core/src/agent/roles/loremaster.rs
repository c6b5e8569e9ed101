use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{now, pick};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "loremaster";
pub const RANK: u32 = 8;

const THEMES: [&str; 5] = ["myth", "war", "exile", "founding", "prophecy"];

const OPENINGS: [&str; 4] = [
    "Long before the first bell rang",
    "In the years the rivers ran backward",
    "When the old kings still walked the roads",
    "After the sky-fire scattered the clans",
];

/// Story and world-history writer
pub struct Loremaster;

fn compose(subject: &str, theme: &str) -> String {
    format!(
        "{}, {} became a tale of {}.",
        pick(subject, &OPENINGS),
        subject.replace('_', " "),
        theme
    )
}

/// Ensure a lore entry is an object with an `expansions` list
fn as_entry(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        let text = value.take();
        *value = json!({ "text": text });
    }
    let entry = value.as_object_mut()?;
    if !entry.get("expansions").map_or(false, Value::is_array) {
        entry.insert("expansions".into(), json!([]));
    }
    Some(entry)
}

#[async_trait]
impl Role for Loremaster {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["write_lore", "expand_lore"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::WriteLore { objective, theme } => {
                let theme = theme.unwrap_or_else(|| pick(&objective, &THEMES).to_string());
                let text = compose(&objective, &theme);

                ctx.knowledge().lore.insert(
                    objective.clone(),
                    json!({
                        "theme": theme,
                        "text": text,
                        "expansions": [],
                        "written_at": now(),
                    }),
                );
                ctx.share_lore("builder", format!("setting:{}", objective), json!(text))
                    .await;
                Ok(Handled::Done)
            }
            AgentAction::ExpandLore { topic } => {
                let lore = &mut ctx.knowledge().lore;
                let value = lore
                    .entry(topic.clone())
                    .or_insert_with(|| json!({ "theme": "legend", "text": compose(&topic, "legend") }));

                let Some(entry) = as_entry(value) else {
                    return Ok(Handled::Done);
                };
                let count = entry["expansions"].as_array().map_or(0, Vec::len);
                let addition = format!(
                    "Chapter {}: {}",
                    count + 1,
                    compose(&format!("{} {}", topic, count), pick(&topic, &THEMES))
                );
                if let Some(list) = entry.get_mut("expansions").and_then(Value::as_array_mut) {
                    list.push(json!(addition));
                }
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}
