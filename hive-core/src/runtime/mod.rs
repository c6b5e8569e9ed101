//! # Hive Runtime
//!
//! Wires the registry, fetcher, scheduler and producers together and owns
//! the process lifecycle.
//!
//! - [`Hive::run`] bootstraps, then drives the scheduler and every producer
//!   with `tokio::join!` until shutdown is triggered.
//! - [`Hive::run_until_idle`] bootstraps, runs one scrape pass and lets the
//!   scheduler drain to quiescence.
//!
//! Both end with every agent flushing its knowledge and the network client
//! being released.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::agent::{AgentRegistry, ExecutionEnv};
use crate::config::HiveConfig;
use crate::error::Result;
use crate::fetch::ResourceFetcher;
use crate::producers::{self, HealthMonitor, TaskGenerator, UrlCatalog};
use crate::scheduler::{Scheduler, SchedulerStats, TaskSender};
use crate::storage::KnowledgeStore;
use crate::telemetry;

mod shutdown;

pub use shutdown::{ShutdownController, ShutdownSignal};

/// Per-agent view used by `status`
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub id: String,
    pub rank: u32,
    pub active: bool,
    pub history: usize,
    pub lore: usize,
    pub projects: usize,
}

pub struct Hive {
    config: HiveConfig,
    registry: Arc<AgentRegistry>,
    fetcher: Arc<ResourceFetcher>,
    catalog: UrlCatalog,
    sender: TaskSender,
    scheduler: Scheduler,
    shutdown: Arc<ShutdownController>,
}

impl Hive {
    /// Build the standard ten-agent hive from configuration
    pub async fn new(config: HiveConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(KnowledgeStore::new(config.storage.knowledge_dir()));
        let registry = Arc::new(AgentRegistry::standard(store)?);
        let fetcher = Arc::new(ResourceFetcher::new(config.fetch.clone())?);
        if config.fetch.worst_case() > config.scheduler.fetch_budget() {
            info!(
                target: telemetry::SCRAPE,
                worst_case_secs = config.fetch.worst_case().as_secs(),
                budget_secs = config.scheduler.fetch_budget().as_secs(),
                "In-task fetches are cut off at the budget"
            );
        }
        let catalog = UrlCatalog::load(&config.url_list_path()).await;

        Ok(Self::with_parts(config, registry, fetcher, catalog))
    }

    /// Assemble from prebuilt parts (custom roles, scripted transports)
    pub fn with_parts(
        config: HiveConfig,
        registry: Arc<AgentRegistry>,
        fetcher: Arc<ResourceFetcher>,
        catalog: UrlCatalog,
    ) -> Self {
        let (sender, inbox) = TaskSender::channel();
        let env = ExecutionEnv::new(registry.clone(), sender.clone())
            .with_fetcher(fetcher.clone())
            .with_fetch_budget(config.scheduler.fetch_budget())
            .with_content_threshold(config.producers.content_threshold);
        let scheduler = Scheduler::new(env, inbox, config.scheduler.task_timeout());

        Self {
            config,
            registry,
            fetcher,
            catalog,
            sender,
            scheduler,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    pub fn config(&self) -> &HiveConfig {
        &self.config
    }

    pub fn sender(&self) -> TaskSender {
        self.sender.clone()
    }

    pub fn registry(&self) -> Arc<AgentRegistry> {
        self.registry.clone()
    }

    pub fn catalog(&self) -> &UrlCatalog {
        &self.catalog
    }

    /// Handle for triggering shutdown from another task (e.g. Ctrl-C)
    pub fn shutdown_handle(&self) -> Arc<ShutdownController> {
        self.shutdown.clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Snapshot of every agent, loading documents that are not in memory yet
    pub async fn status(&self) -> Vec<AgentStatus> {
        let mut statuses = Vec::with_capacity(self.registry.len());
        for agent in self.registry.iter() {
            let doc = agent.snapshot().await;
            statuses.push(AgentStatus {
                id: agent.id().to_string(),
                rank: agent.rank(),
                active: agent.is_active(),
                history: doc.history.len(),
                lore: doc.lore.len(),
                projects: doc.projects.len(),
            });
        }
        statuses
    }

    /// Long-lived run until the shutdown handle is triggered
    pub async fn run(mut self) -> Result<SchedulerStats> {
        let producers_cfg = self.config.producers.clone();
        producers::bootstrap(&self.sender, &producers_cfg.bootstrap_objective)?;

        let signal = self.shutdown.signal();
        let generator = TaskGenerator::new(producers_cfg.generator_seed).run(
            self.sender.clone(),
            signal.clone(),
            producers_cfg.generator_interval(),
        );
        let monitor = HealthMonitor::new(self.registry.clone())
            .run(signal.clone(), producers_cfg.monitor_interval());
        let scrapers = producers::run_pipelines(
            self.catalog.pipelines(&self.fetcher),
            self.sender.clone(),
            signal.clone(),
            producers_cfg.rescrape_interval(),
        );

        info!(
            target: telemetry::TASK,
            agents = self.registry.len(),
            urls = self.catalog.len(),
            "Hive running"
        );

        let (stats, (), (), ()) = tokio::join!(self.scheduler.run(signal), generator, monitor, scrapers);

        self.finish().await;
        Ok(stats)
    }

    /// Bootstrap, one scrape pass, then dispatch until nothing is left
    pub async fn run_until_idle(mut self) -> Result<SchedulerStats> {
        producers::bootstrap(&self.sender, &self.config.producers.bootstrap_objective)?;
        let pipelines = self.catalog.pipelines(&self.fetcher);
        producers::scrape_all(&pipelines, &self.sender).await;
        drop(pipelines);

        let stats = self.scheduler.run_until_idle().await;
        self.shutdown.trigger();
        self.finish().await;
        Ok(stats)
    }

    /// Flush all knowledge and drop the scheduler, which holds the last
    /// references to the network client
    async fn finish(self) {
        let failures = self.registry.flush_all().await;
        if failures > 0 {
            warn!(target: telemetry::KNOWLEDGE, failures, "Some knowledge was not flushed");
        }

        let cached = self.fetcher.cache_len();
        drop(self.scheduler);
        drop(self.fetcher);
        info!(
            target: telemetry::TASK,
            cached_pages = cached,
            "Hive stopped, network client released"
        );
    }
}
