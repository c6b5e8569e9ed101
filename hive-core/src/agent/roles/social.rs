use async_trait::async_trait;
use serde_json::json;

use super::{now, pick, slug, with_section};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "social";
pub const RANK: u32 = 4;

const EMOTES: [&str; 6] = ["wave", "bow", "grin", "nod", "shrug", "cheer"];

const CHANNEL_COLORS: [&str; 4] = ["cyan", "magenta", "yellow", "green"];

/// Emotes and communication channels
pub struct Social;

fn third_person(verb: &str) -> String {
    if verb.ends_with('s') || verb.ends_with("sh") || verb.ends_with("ch") {
        format!("{}es", verb)
    } else {
        format!("{}s", verb)
    }
}

#[async_trait]
impl Role for Social {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["create_emote", "design_channel"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::CreateEmote { name } => {
                let verb = name
                    .map(|n| slug(&n))
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| pick(ctx.task().id.as_str(), &EMOTES).to_string());
                let they = third_person(&verb);

                let emote = json!({
                    "self": format!("You {}.", verb),
                    "room": format!("$n {}.", they),
                    "target_self": format!("You {} at $N.", verb),
                    "target_room": format!("$n {} at $N.", they),
                    "created_at": now(),
                });
                with_section(&mut ctx.knowledge().mechanics, "emotes", |emotes| {
                    emotes.insert(verb, emote);
                });
                Ok(Handled::Done)
            }
            AgentAction::DesignChannel { name } => {
                let name = name.map(|n| slug(&n)).unwrap_or_else(|| "chat".into());
                let channel = json!({
                    "prefix": format!("[{}]", name),
                    "color": pick(&name, &CHANNEL_COLORS),
                    "history_size": 50,
                    "min_level": 1,
                    "designed_at": now(),
                });
                with_section(&mut ctx.knowledge().mechanics, "channels", |channels| {
                    channels.insert(name, channel);
                });
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::roles::testing::Harness;
    use hive_types::Task;

    #[test]
    fn test_third_person() {
        assert_eq!(third_person("wave"), "waves");
        assert_eq!(third_person("blush"), "blushes");
    }

    #[tokio::test]
    async fn test_emote_and_channel() {
        let h = Harness::new();
        h.run(Task::new(ID, "create_emote").with_param("name", "Wave"))
            .await
            .unwrap();
        h.run(Task::new(ID, "create_emote")).await.unwrap();
        h.run(Task::new(ID, "design_channel")).await.unwrap();

        let doc = h.doc(ID).await;
        assert_eq!(doc.mechanics["emotes"]["wave"]["room"], json!("$n waves."));
        assert!(!doc.mechanics["emotes"].as_object().unwrap().is_empty());
        assert_eq!(doc.mechanics["channels"]["chat"]["prefix"], json!("[chat]"));
    }
}
