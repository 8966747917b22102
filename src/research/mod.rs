//! The iterative research control loop.
//!
//! [`orchestrator::Orchestrator`] ties the other components together:
//! plan generation, batch query generation, collection, summarization,
//! the completion decision, and persistence, under the iteration bound
//! and the single-active-task invariant.
//!
//! # Workflow
//!
//! 1. **Planning** — generate the research plan and the first query batch
//! 2. **Iterating** — per round: search + scrape + summarize + persist,
//!    then ask the completion judge whether to continue
//! 3. **Finalizing** — whole-task summary, conclusion, report artifact
//! 4. **Archived** — state moved to a numbered archive slot,
//!    unconditionally, even after an error

/// The orchestrator state machine.
pub mod orchestrator;
/// Bounded retry with input refinement.
pub mod retry;

pub use orchestrator::Orchestrator;
