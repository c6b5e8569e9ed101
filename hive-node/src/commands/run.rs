//! `hive run`

use anyhow::Context;
use hive_core::Hive;
use tracing::{info, warn};

use super::{print_json, GlobalOptions};

pub async fn execute(options: &GlobalOptions, until_idle: bool) -> anyhow::Result<()> {
    let config = options.load_config()?;
    let data_dir = config.storage.data_dir.clone();
    let hive = Hive::new(config).await.context("failed to start hive")?;

    info!(data_dir = %data_dir.display(), until_idle, "Starting hive");

    let stats = if until_idle {
        hive.run_until_idle().await?
    } else {
        let handle = hive.shutdown_handle();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, shutting down");
                    handle.trigger();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        });
        hive.run().await?
    };

    if options.json {
        print_json(&stats)?;
    } else {
        println!("Dispatched:  {}", stats.dispatched);
        println!("Completed:   {}", stats.completed);
        println!("Unsupported: {}", stats.unsupported);
        println!("Waiting:     {}", stats.waiting);
        println!("Failed:      {}", stats.failed);
        println!("Timed out:   {}", stats.timed_out);
        println!("Dropped:     {}", stats.dropped);
    }
    Ok(())
}
