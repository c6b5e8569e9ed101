//! `hive knowledge show|reset <agent>`

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Subcommand;
use hive_core::{AgentRegistry, KnowledgeStore};

use super::GlobalOptions;

#[derive(Debug, Subcommand)]
pub enum KnowledgeAction {
    /// Print an agent's knowledge document
    Show {
        /// Agent id (e.g. overseer, builder)
        agent: String,
    },

    /// Replace an agent's knowledge document with an empty one
    Reset {
        /// Agent id
        agent: String,
    },
}

fn registry(options: &GlobalOptions) -> anyhow::Result<AgentRegistry> {
    let config = options.load_config()?;
    let store = Arc::new(KnowledgeStore::new(config.storage.knowledge_dir()));
    AgentRegistry::standard(store).context("failed to build agent registry")
}

pub async fn execute(options: &GlobalOptions, action: KnowledgeAction) -> anyhow::Result<()> {
    let registry = registry(options)?;

    match action {
        KnowledgeAction::Show { agent: id } => {
            let Some(agent) = registry.get(&id) else {
                bail!("unknown agent '{}' (known: {})", id, registry.ids().join(", "));
            };
            let doc = agent.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        KnowledgeAction::Reset { agent: id } => {
            let Some(agent) = registry.get(&id) else {
                bail!("unknown agent '{}' (known: {})", id, registry.ids().join(", "));
            };
            agent.reset().await?;
            if !options.json {
                println!("✅ Knowledge for '{}' reset", id);
            }
        }
    }
    Ok(())
}
