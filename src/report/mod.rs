//! Plain-text report artifact.
//!
//! Sections: initial query and plan, per-iteration findings
//! (query/url/summary triples plus the batch summary), final summary,
//! conclusion, and a numbered reference list of every scraped URL in
//! fetch order.

use crate::state::TaskStore;
use crate::types::{AppError, ResearchTask, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Render the report body for a finished task.
pub fn render(task: &ResearchTask) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Initial Query: {}", task.initial_query);
    let _ = writeln!(out, "Plan:\n{}\n", task.plan);

    let _ = writeln!(out, "### Findings");
    for iteration in &task.iterations {
        let _ = writeln!(out, "Iteration {}:\n_______", iteration.number);
        for result in &iteration.results {
            let _ = writeln!(
                out,
                "\nQuery: {}\nURL: {}\nSummary: {}",
                result.query, result.url, result.summary
            );
        }
        let _ = writeln!(out, "Batch Summary: {}\n", iteration.summary);
    }

    let _ = writeln!(
        out,
        "### Summary\n{}\n",
        task.final_summary.as_deref().unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "### Conclusion\n{}\n",
        task.conclusion.as_deref().unwrap_or_default()
    );

    let _ = writeln!(out, "### References");
    for (i, url) in task.used_urls.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, url);
    }

    out
}

/// Write the report next to the task's other artifacts, returning its
/// path.
pub fn write(store: &TaskStore, task: &ResearchTask) -> Result<PathBuf> {
    let path = store.unique_path(&task.base_name, "txt");
    fs::write(&path, render(task))
        .map_err(|e| AppError::State(format!("cannot write report: {e}")))?;
    Ok(path)
}
