//! Delver CLI: run a research task from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use delver::{Orchestrator, OllamaClient, ResearchConfig, TracingNotifier};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delver", version, about = "Iterative research orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a research task for a query.
    Run {
        /// The research query.
        query: Vec<String>,
        /// Operator identity recorded in the task state.
        #[arg(long, default_value = "operator")]
        user: String,
    },
    /// Show whether a research task is currently active.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = ResearchConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Run { query, user } => {
            let query = query.join(" ");
            let llm = Arc::new(
                OllamaClient::new(
                    &config.ollama_url,
                    &config.ollama_model,
                    Duration::from_secs(config.generate_timeout_secs),
                )
                .context("failed to build generation client")?,
            );

            let orchestrator = Orchestrator::new(config, llm, Arc::new(TracingNotifier))
                .context("failed to build orchestrator")?;

            let cancel = CancellationToken::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, stopping after current iteration");
                    ctrl_c_cancel.cancel();
                }
            });

            // The task runs as an independent background unit of work,
            // decoupled from the trigger path.
            let handle =
                tokio::spawn(async move { orchestrator.run(&user, &query, cancel).await });
            let task = handle.await.context("research task panicked")??;
            tracing::info!(
                id = %task.id,
                iterations = task.iterations.len(),
                "research finished"
            );
        }
        Command::Status => {
            let store = delver::TaskStore::new(config.data_dir)?;
            if store.is_active() {
                println!("A research task is currently in progress.");
            } else {
                println!("No active research task.");
            }
        }
    }

    Ok(())
}
