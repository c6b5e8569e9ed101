use async_trait::async_trait;
use serde_json::{json, Value};

use super::{now, pick, record_mut, slug};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::{HiveError, Result};

pub const ID: &str = "builder";
pub const RANK: u32 = 5;

const DEFAULT_ROOMS: u32 = 3;
const MAX_ROOMS: u32 = 12;

const ROOM_KINDS: [&str; 8] = [
    "Gate", "Square", "Alley", "Hall", "Cellar", "Tower", "Dock", "Garden",
];

const INHABITANTS: [&str; 6] = [
    "a watchful guard",
    "a tired merchant",
    "a stray cat",
    "a hooded stranger",
    "a gossiping old woman",
    "a lost apprentice",
];

/// Area and room builder
pub struct Builder;

fn rooms(objective: &str, count: u32, setting: Option<&str>) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let name = format!("{} {}", pick(&format!("{}#{}", objective, i), &ROOM_KINDS), i + 1);
            let mut exits = serde_json::Map::new();
            if i > 0 {
                exits.insert("west".into(), json!(i - 1));
            }
            if i + 1 < count {
                exits.insert("east".into(), json!(i + 1));
            }
            json!({
                "vnum": i,
                "name": name,
                "description": setting.unwrap_or("An unremarkable stretch of the world."),
                "exits": exits,
            })
        })
        .collect()
}

#[async_trait]
impl Role for Builder {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["build_area", "populate_area"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::BuildArea { objective, rooms: count } => {
                let count = count.unwrap_or(DEFAULT_ROOMS).clamp(1, MAX_ROOMS);
                let knowledge = ctx.knowledge();
                // loremaster 共享的场景描述
                let setting = knowledge
                    .lore
                    .get(&format!("setting:{}", objective))
                    .and_then(Value::as_str)
                    .map(str::to_string);

                let area = json!({
                    "objective": objective,
                    "rooms": rooms(&objective, count, setting.as_deref()),
                    "built_at": now(),
                });
                knowledge.projects.insert(slug(&objective), area);
                Ok(Handled::Done)
            }
            AgentAction::PopulateArea { area } => {
                let key = slug(&area);
                let stored = ctx
                    .knowledge()
                    .projects
                    .get_mut(&key)
                    .ok_or_else(|| HiveError::invalid_input(format!("unknown area '{}'", area)))?;
                let entry = record_mut(stored, &key)?;

                if let Some(rooms) = entry.get_mut("rooms").and_then(Value::as_array_mut) {
                    for (i, room) in rooms.iter_mut().enumerate() {
                        if let Some(room) = room.as_object_mut() {
                            room.insert(
                                "inhabitants".into(),
                                json!([pick(&format!("{}#{}", key, i), &INHABITANTS)]),
                            );
                        }
                    }
                }
                entry.insert("populated_at".into(), json!(now()));
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
    fn test_rooms_are_linked() {
        let built = rooms("harbor", 3, None);
        assert_eq!(built.len(), 3);
        assert_eq!(built[0]["exits"], json!({"east": 1}));
        assert_eq!(built[1]["exits"], json!({"west": 0, "east": 2}));
        assert_eq!(built[2]["exits"], json!({"west": 1}));
    }

    #[tokio::test]
    async fn test_build_uses_shared_setting_then_populate() {
        let h = Harness::new();
        h.run(Task::new("loremaster", "write_lore").with_param("objective", "Salt Market"))
            .await
            .unwrap();
        h.run(
            Task::new(ID, "build_area")
                .with_param("objective", "Salt Market")
                .with_param("rooms", 40),
        )
        .await
        .unwrap();
        h.run(Task::new(ID, "populate_area").with_param("area", "salt market"))
            .await
            .unwrap();

        let doc = h.doc(ID).await;
        let area = &doc.projects["salt-market"];
        let rooms = area["rooms"].as_array().unwrap();
        assert_eq!(rooms.len(), MAX_ROOMS as usize);
        assert!(rooms[0]["description"].as_str().unwrap().contains("Salt Market"));
        assert!(rooms.iter().all(|r| r["inhabitants"].is_array()));
    }

    #[tokio::test]
    async fn test_populate_tolerates_legacy_entries() {
        let h = Harness::new();
        let dir = h.data_dir().join("knowledge");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("builder.json"),
            r#"{"mechanics":{},"lore":{},"tasks":[],"history":[],"embeddings":{},
                "projects":{"old-quay":"legacy","dock":{"rooms":["bare",{"name":"Pier"}]}}}"#,
        )
        .unwrap();

        let result = h
            .run(Task::new(ID, "populate_area").with_param("area", "old quay"))
            .await;
        assert!(matches!(result, Err(HiveError::InvalidInput(_))));

        h.run(Task::new(ID, "populate_area").with_param("area", "dock"))
            .await
            .unwrap();
        let doc = h.doc(ID).await;
        assert_eq!(doc.projects["old-quay"], json!("legacy"));
        assert_eq!(doc.projects["dock"]["rooms"][0], json!("bare"));
        assert!(doc.projects["dock"]["rooms"][1]["inhabitants"].is_array());
    }

    #[tokio::test]
    async fn test_populate_unknown_area_fails() {
        let h = Harness::new();
        assert!(h
            .run(Task::new(ID, "populate_area").with_param("area", "nowhere"))
            .await
            .is_err());
    }
}
