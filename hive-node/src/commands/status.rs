//! `hive status`, `hive agents`, `hive urls`

use std::sync::Arc;

use hive_core::producers::UrlCatalog;
use hive_core::{AgentRegistry, Hive, KnowledgeStore};
use serde_json::json;

use super::{print_json, GlobalOptions};

pub async fn agents(options: &GlobalOptions) -> anyhow::Result<()> {
    let config = options.load_config()?;
    let store = Arc::new(KnowledgeStore::new(config.storage.knowledge_dir()));
    let registry = AgentRegistry::standard(store)?;

    if options.json {
        let list: Vec<_> = registry
            .iter()
            .map(|agent| json!({ "id": agent.id(), "rank": agent.rank(), "actions": agent.actions() }))
            .collect();
        return print_json(&list);
    }

    println!("{:<12} {:>4}  ACTIONS", "AGENT", "RANK");
    for agent in registry.iter() {
        println!("{:<12} {:>4}  {}", agent.id(), agent.rank(), agent.actions().join(", "));
    }
    Ok(())
}

pub async fn urls(options: &GlobalOptions) -> anyhow::Result<()> {
    let config = options.load_config()?;
    let path = config.url_list_path();
    let catalog = UrlCatalog::load(&path).await;

    if options.json {
        let categories: serde_json::Map<String, serde_json::Value> = catalog
            .iter()
            .map(|(name, urls)| (name.to_string(), json!(urls)))
            .collect();
        return print_json(&json!({ "path": path, "categories": categories }));
    }

    println!("URL list: {}", path.display());
    for (category, urls) in catalog.iter() {
        println!("\n[{}] {} url(s)", category, urls.len());
        for url in urls {
            println!("  {}", url);
        }
    }
    Ok(())
}

pub async fn status(options: &GlobalOptions) -> anyhow::Result<()> {
    let config = options.load_config()?;
    let data_dir = config.storage.data_dir.clone();
    let knowledge_dir = config.storage.knowledge_dir();
    let task_timeout = config.scheduler.task_timeout_secs;
    let hive = Hive::new(config).await?;
    let agents = hive.status().await;

    if options.json {
        return print_json(&json!({
            "version": hive_core::VERSION,
            "data_dir": data_dir,
            "knowledge_dir": knowledge_dir,
            "task_timeout_secs": task_timeout,
            "urls": hive.catalog().len(),
            "agents": agents,
        }));
    }

    println!("Hive v{}", hive_core::VERSION);
    println!("Data dir:      {}", data_dir.display());
    println!("Knowledge dir: {}", knowledge_dir.display());
    println!("Task timeout:  {}s", task_timeout);
    println!("URLs:          {}", hive.catalog().len());
    println!();
    println!(
        "{:<12} {:>4} {:>7} {:>7} {:>5} {:>8}",
        "AGENT", "RANK", "ACTIVE", "HISTORY", "LORE", "PROJECTS"
    );
    for agent in agents {
        println!(
            "{:<12} {:>4} {:>7} {:>7} {:>5} {:>8}",
            agent.id,
            agent.rank,
            if agent.active { "yes" } else { "no" },
            agent.history,
            agent.lore,
            agent.projects
        );
    }
    Ok(())
}
