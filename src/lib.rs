//! # Delver - Iterative Research Orchestrator
//!
//! An autonomous research agent: given an open natural-language query it
//! plans a research strategy, repeatedly queries a search service,
//! politely scrapes and condenses web content, judges for itself whether
//! it has gathered enough information, and emits a structured, cited
//! report. A local Ollama-compatible model supplies all generations.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use delver::{Orchestrator, OllamaClient, ResearchConfig, TracingNotifier};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResearchConfig::from_env()?;
//!     let llm = Arc::new(OllamaClient::new(
//!         &config.ollama_url,
//!         &config.ollama_model,
//!         Duration::from_secs(config.generate_timeout_secs),
//!     )?);
//!
//!     let orchestrator = Orchestrator::new(config, llm, Arc::new(TracingNotifier))?;
//!     let task = orchestrator
//!         .run("operator", "impact of AI on journalism 2024", CancellationToken::new())
//!         .await?;
//!     println!("{} iterations", task.iterations.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`research`] - The orchestrator control loop
//! - [`llm`] - Generation service clients
//! - [`parse`] - Structured extraction from free-text model output
//! - [`collect`] - Search and polite scraping
//! - [`summarize`] - Page / batch / task condensation
//! - [`judge`] - Continue-vs-stop policy
//! - [`state`] - Persistence, locking, archival
//! - [`report`] - Plain-text report artifact
//! - [`notify`] - Progress notification seam
//! - [`types`] - Data model and error handling
//!
//! ## Known Limitations
//!
//! One research task at a time, by design. A task cannot be resumed
//! after a process crash; the persisted state exists for inspection and
//! audit. Cancellation is cooperative and only observed at iteration
//! boundaries.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Search, robots compliance, and page-text extraction.
pub mod collect;
/// Runtime configuration.
pub mod config;
/// Completion-decision policy.
pub mod judge;
/// Generation service clients.
pub mod llm;
/// Progress notification seam.
pub mod notify;
/// Structured extraction from model output.
pub mod parse;
/// Plain-text report artifact.
pub mod report;
/// The orchestrator control loop.
pub mod research;
/// Task persistence, locking, and archival.
pub mod state;
/// Condensation prompts.
pub mod summarize;
/// Core types and error handling.
pub mod types;

// Re-export commonly used types
pub use config::ResearchConfig;
pub use llm::{LLMClient, OllamaClient};
pub use notify::{Notifier, TracingNotifier};
pub use parse::{Decision, ParseOutcome};
pub use research::Orchestrator;
pub use state::TaskStore;
pub use types::{AppError, ResearchTask, Result, TaskStatus};
