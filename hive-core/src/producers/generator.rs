//! Random task generator
//!
//! Emits one task from a fixed catalog every interval until shutdown.

use std::time::Duration;

use hive_types::Task;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::runtime::ShutdownSignal;
use crate::scheduler::TaskSender;
use crate::telemetry;

/// (agent, action, parameter name, candidate values)
type CatalogEntry = (&'static str, &'static str, Option<(&'static str, &'static [&'static str])>);

const OBJECTIVES: &[&str] = &["harbor_district", "northern_wilds", "underdark", "guild_hall"];

const CATALOG: &[CatalogEntry] = &[
    ("social", "create_emote", Some(("name", &["wave", "bow", "grin", "shrug", "cackle"]))),
    ("social", "design_channel", Some(("name", &["ooc", "trade", "newbie", "guild"]))),
    ("combat", "simulate_encounter", None),
    ("combat", "balance_combat", Some(("objective", OBJECTIVES))),
    ("protocol", "define_ansi_theme", Some(("name", &["classic", "muted"]))),
    ("loremaster", "expand_lore", Some(("topic", &["old roads", "river gods", "sunken keep"]))),
    ("architect", "design_mechanics", Some(("objective", OBJECTIVES))),
    ("builder", "build_area", Some(("objective", OBJECTIVES))),
    ("gatekeeper", "design_character_creation", None),
    ("reviewer", "audit", None),
];

pub struct TaskGenerator {
    rng: StdRng,
}

impl TaskGenerator {
    /// Seeded generators produce the same sequence every run
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn catalog_len() -> usize {
        CATALOG.len()
    }

    pub fn next_task(&mut self) -> Task {
        let idx = self.rng.gen_range(0..CATALOG.len());
        let (agent, action, param) = CATALOG[idx];

        let mut task = Task::new(agent, action);
        if let Some((key, values)) = param {
            if let Some(value) = values.choose(&mut self.rng) {
                task = task.with_param(key, *value);
            }
        }
        task
    }

    pub async fn run(mut self, sender: TaskSender, mut shutdown: ShutdownSignal, interval: Duration) {
        info!(
            target: telemetry::TASK,
            interval_secs = interval.as_secs(),
            "Task generator started"
        );

        loop {
            if shutdown.sleep(interval).await {
                break;
            }

            let task = self.next_task();
            debug!(target: telemetry::TASK, task = %task.label(), "Generated task");
            if let Err(e) = sender.enqueue(task) {
                warn!(target: telemetry::TASK, "Generator stopping: {}", e);
                break;
            }
        }

        info!(target: telemetry::TASK, "Task generator stopped");
    }
}
