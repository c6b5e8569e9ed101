//! Background task producers
//!
//! Every producer only talks to the scheduler through a [`TaskSender`](crate::scheduler::TaskSender)
//! and stops when the shutdown signal fires.

mod bootstrap;
mod generator;
mod monitor;
pub mod scrape;

pub use bootstrap::{bootstrap, seed_tasks};
pub use generator::TaskGenerator;
pub use monitor::HealthMonitor;
pub use scrape::{categorize, run_pipelines, scrape_all, ScrapePipeline, UrlCatalog};
