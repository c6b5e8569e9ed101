use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type TaskId = String;
pub type AgentId = String;

/// Queue escalation level. `High` jumps to the head of the pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Normal,
    High,
}

impl TaskPriority {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

/// A prior `(actor, action)` that must appear in the target agent's history
/// before the task is allowed to take effect.
///
/// Accepts either a bare action string (`"plan"`) or an object
/// (`{"actor": "overseer", "action": "plan"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(from = "DependencyRepr")]
pub struct Dependency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<AgentId>,
    pub action: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyRepr {
    Action(String),
    Full {
        #[serde(default)]
        actor: Option<AgentId>,
        action: String,
    },
}

impl From<DependencyRepr> for Dependency {
    fn from(repr: DependencyRepr) -> Self {
        match repr {
            DependencyRepr::Action(action) => Self { actor: None, action },
            DependencyRepr::Full { actor, action } => Self { actor, action },
        }
    }
}

impl Dependency {
    /// Dependency on an action performed by any actor
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            actor: None,
            action: action.into(),
        }
    }

    /// Dependency on an action performed by a specific agent
    pub fn on(actor: impl Into<AgentId>, action: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
            action: action.into(),
        }
    }

    /// Check whether a completed task satisfies this dependency
    pub fn is_satisfied_by(&self, task: &Task) -> bool {
        if task.action != self.action {
            return false;
        }
        match &self.actor {
            Some(actor) => actor == &task.target_agent,
            None => true,
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.actor {
            Some(actor) => write!(f, "{}.{}", actor, self.action),
            None => write!(f, "{}", self.action),
        }
    }
}

/// An addressed action request.
///
/// Tasks are immutable once enqueued and are destroyed on dequeue.
/// Duplicates are legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub target_agent: AgentId,
    pub action: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Dependency>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(target_agent: impl Into<AgentId>, action: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target_agent: target_agent.into(),
            action: action.into(),
            parameters: Map::new(),
            depends_on: None,
            priority: TaskPriority::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.depends_on = Some(dependency);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn high_priority(self) -> Self {
        self.with_priority(TaskPriority::High)
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// String parameter, `None` when absent or not a string
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// Short label for log lines: `agent.action#id-prefix`
    pub fn label(&self) -> String {
        let short = self.id.get(..8).unwrap_or(&self.id);
        format!("{}.{}#{}", self.target_agent, self.action, short)
    }
}
