//! Agent registry
//!
//! Built once at startup. Lookups are by id; iteration keeps registration
//! order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use super::{roles, Agent, Role};
use crate::error::{HiveError, Result};
use crate::storage::{KnowledgeStore, Paths};
use crate::telemetry;

#[derive(Debug)]
pub struct AgentRegistry {
    agents: Vec<Arc<Agent>>,
    index: HashMap<String, usize>,
}

pub struct AgentRegistryBuilder {
    store: Arc<KnowledgeStore>,
    roles: Vec<Box<dyn Role>>,
}

impl AgentRegistryBuilder {
    pub fn role(mut self, role: impl Role + 'static) -> Self {
        self.roles.push(Box::new(role));
        self
    }

    pub fn boxed_role(mut self, role: Box<dyn Role>) -> Self {
        self.roles.push(role);
        self
    }

    /// Register the ten built-in roles
    pub fn with_standard_roles(mut self) -> Self {
        self.roles.extend(roles::standard_roles());
        self
    }

    pub fn build(self) -> Result<AgentRegistry> {
        let mut agents = Vec::with_capacity(self.roles.len());
        let mut index = HashMap::with_capacity(self.roles.len());

        for role in self.roles {
            let id = role.id().to_string();
            if !Paths::is_safe_id(&id) {
                return Err(HiveError::configuration(format!(
                    "Agent id '{}' must match [A-Za-z0-9_-]+",
                    id
                )));
            }
            if index.contains_key(&id) {
                return Err(HiveError::configuration(format!(
                    "Agent '{}' registered twice",
                    id
                )));
            }
            index.insert(id, agents.len());
            agents.push(Arc::new(Agent::new(role, self.store.clone())));
        }

        Ok(AgentRegistry { agents, index })
    }
}

impl AgentRegistry {
    pub fn builder(store: Arc<KnowledgeStore>) -> AgentRegistryBuilder {
        AgentRegistryBuilder {
            store,
            roles: Vec::new(),
        }
    }

    /// Registry with the ten built-in roles
    pub fn standard(store: Arc<KnowledgeStore>) -> Result<Self> {
        Self::builder(store).with_standard_roles().build()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Agent>> {
        self.index.get(id).map(|&i| &self.agents[i])
    }

    pub fn rank_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|agent| agent.rank())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Flush every loaded document; returns the number of failures
    pub async fn flush_all(&self) -> usize {
        let mut failures = 0;
        for agent in &self.agents {
            if let Err(e) = agent.flush().await {
                failures += 1;
                error!(
                    target: telemetry::ERROR,
                    agent = agent.id(),
                    "Flush failed: {}",
                    e
                );
            }
        }
        info!(
            target: telemetry::KNOWLEDGE,
            agents = self.agents.len(),
            failures,
            "Knowledge flushed"
        );
        failures
    }
}
