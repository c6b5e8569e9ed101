//! Typed agent actions
//!
//! A task's `(action, parameters)` pair is parsed into [`AgentAction`]
//! before it reaches a role. Unknown names parse to `None`; a known name
//! whose parameters do not fit is an `InvalidInput` error. Parameters the
//! variant does not declare (such as `handoff`) are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{HiveError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
pub enum AgentAction {
    // overseer
    Plan {
        objective: String,
    },

    // architect
    DesignMechanics {
        objective: String,
        system: Option<String>,
    },
    RefineMechanics {
        objective: String,
    },

    // loremaster
    WriteLore {
        objective: String,
        theme: Option<String>,
    },
    ExpandLore {
        topic: String,
    },

    // archivist
    ProcessContent {
        source: String,
        content: String,
        category: Option<String>,
    },
    DeepProcess {
        source: String,
    },
    IngestUrl {
        url: String,
    },

    // combat
    BalanceCombat {
        objective: String,
    },
    SimulateEncounter {
        attacker: Option<String>,
        defender: Option<String>,
    },

    // builder
    BuildArea {
        objective: String,
        rooms: Option<u32>,
    },
    PopulateArea {
        area: String,
    },

    // social
    CreateEmote {
        name: Option<String>,
    },
    DesignChannel {
        name: Option<String>,
    },

    // gatekeeper
    DesignLogin {
        objective: Option<String>,
    },
    DesignCharacterCreation {
        objective: Option<String>,
    },

    // protocol
    NegotiateProtocol {
        options: Option<Vec<String>>,
    },
    DefineAnsiTheme {
        name: Option<String>,
    },

    // reviewer
    Review {
        objective: String,
    },
    Audit {},
}

impl AgentAction {
    /// Every action name the engine understands
    pub const NAMES: [&'static str; 20] = [
        "plan",
        "design_mechanics",
        "refine_mechanics",
        "write_lore",
        "expand_lore",
        "process_content",
        "deep_process",
        "ingest_url",
        "balance_combat",
        "simulate_encounter",
        "build_area",
        "populate_area",
        "create_emote",
        "design_channel",
        "design_login",
        "design_character_creation",
        "negotiate_protocol",
        "define_ansi_theme",
        "review",
        "audit",
    ];

    pub fn is_known(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    /// Parse an action; `Ok(None)` for names outside [`Self::NAMES`]
    pub fn parse(name: &str, parameters: &Map<String, Value>) -> Result<Option<Self>> {
        if !Self::is_known(name) {
            return Ok(None);
        }

        let tagged = serde_json::json!({
            "action": name,
            "parameters": Value::Object(parameters.clone()),
        });

        serde_json::from_value(tagged)
            .map(Some)
            .map_err(|e| HiveError::invalid_input(format!("{}: {}", name, e)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plan { .. } => "plan",
            Self::DesignMechanics { .. } => "design_mechanics",
            Self::RefineMechanics { .. } => "refine_mechanics",
            Self::WriteLore { .. } => "write_lore",
            Self::ExpandLore { .. } => "expand_lore",
            Self::ProcessContent { .. } => "process_content",
            Self::DeepProcess { .. } => "deep_process",
            Self::IngestUrl { .. } => "ingest_url",
            Self::BalanceCombat { .. } => "balance_combat",
            Self::SimulateEncounter { .. } => "simulate_encounter",
            Self::BuildArea { .. } => "build_area",
            Self::PopulateArea { .. } => "populate_area",
            Self::CreateEmote { .. } => "create_emote",
            Self::DesignChannel { .. } => "design_channel",
            Self::DesignLogin { .. } => "design_login",
            Self::DesignCharacterCreation { .. } => "design_character_creation",
            Self::NegotiateProtocol { .. } => "negotiate_protocol",
            Self::DefineAnsiTheme { .. } => "define_ansi_theme",
            Self::Review { .. } => "review",
            Self::Audit {} => "audit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_parse_known_action() {
        let action = AgentAction::parse(
            "build_area",
            &params(json!({"objective": "harbor", "rooms": 4, "handoff": "reviewer"})),
        )
        .unwrap();

        assert_eq!(
            action,
            Some(AgentAction::BuildArea {
                objective: "harbor".into(),
                rooms: Some(4),
            })
        );
    }

    #[test]
    fn test_optional_and_empty_parameters() {
        assert_eq!(
            AgentAction::parse("create_emote", &Map::new()).unwrap(),
            Some(AgentAction::CreateEmote { name: None })
        );
        assert_eq!(
            AgentAction::parse("audit", &Map::new()).unwrap(),
            Some(AgentAction::Audit {})
        );
    }

    #[test]
    fn test_unknown_action_is_none() {
        assert_eq!(AgentAction::parse("dance", &Map::new()).unwrap(), None);
    }

    #[test]
    fn test_missing_required_parameter_is_invalid_input() {
        let err = AgentAction::parse("plan", &Map::new()).unwrap_err();
        assert!(matches!(err, HiveError::InvalidInput(_)));
    }

    #[test]
    fn test_names_round_trip() {
        let action = AgentAction::parse("refine_mechanics", &params(json!({"objective": "x"})))
            .unwrap()
            .unwrap();
        assert_eq!(action.name(), "refine_mechanics");
        assert!(AgentAction::NAMES.iter().all(|n| AgentAction::is_known(n)));
    }
}
