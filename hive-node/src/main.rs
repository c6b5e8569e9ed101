//! # Hive CLI
//!
//! Command-line entry point for the Hive orchestration engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

mod commands;

use commands::knowledge::KnowledgeAction;

/// CLI structure
#[derive(Parser, Debug)]
#[command(name = "hive")]
#[command(about = "Hive - ranked multi-agent task orchestration")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to HIVE_CONFIG, ./hive.toml, then the platform config dir)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug for hive targets)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the scheduler and all producers
    Run {
        /// Stop once the bootstrap work and one scrape pass are fully processed
        #[arg(long)]
        until_idle: bool,
    },

    /// List registered agents and their ranks
    Agents,

    /// Inspect or reset an agent's knowledge document
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },

    /// Show the URL catalog by category
    Urls,

    /// Show configuration, paths and per-agent knowledge summary
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "hive=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    info!("Running command: {:?}", cli.command);

    if let Err(e) = run_command(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let options = commands::GlobalOptions {
        config: cli.config,
        data_dir: cli.data_dir,
        json: cli.json,
    };

    match cli.command {
        Commands::Run { until_idle } => commands::run::execute(&options, until_idle).await,
        Commands::Agents => commands::status::agents(&options).await,
        Commands::Knowledge { action } => commands::knowledge::execute(&options, action).await,
        Commands::Urls => commands::status::urls(&options).await,
        Commands::Status => commands::status::status(&options).await,
    }
}
