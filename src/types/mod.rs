//! Core types: the research task data model and error handling.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============= Task State Types =============

/// Lifecycle status of a research task.
///
/// Transitions are monotonic: `Pending` moves to exactly one of
/// `Complete` or `Error` and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is in flight.
    Pending,
    /// Task finished with a final summary.
    Complete,
    /// Task aborted on a fatal error.
    Error,
}

/// One scraped-and-summarized page for a single search query.
///
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The search query that surfaced this page.
    pub query: String,
    /// The page URL.
    pub url: String,
    /// The page title as reported by the search service.
    pub title: String,
    /// Model-generated condensation of the page content.
    pub summary: String,
}

/// One research round: the results gathered for a batch of queries
/// plus a condensation of the whole round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    /// 1-based iteration number, strictly increasing with no gaps.
    pub number: u32,
    /// Results gathered this round, in query order.
    pub results: Vec<QueryResult>,
    /// Condensation of this round's item summaries.
    pub summary: String,
}

/// The durable record of a research task; the single source of truth
/// for persistence, audit, and the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchTask {
    /// Opaque unique identifier, generated at start, never reused.
    pub id: Uuid,
    /// Provenance: who triggered the task.
    pub user_id: String,
    /// Provenance: start date, `YYYY-MM-DD`.
    pub created_date: String,
    /// The literal user input; immutable after creation.
    pub initial_query: String,
    /// Free-text research plan; produced once, never revised.
    pub plan: String,
    /// Completed rounds, append-only.
    pub iterations: Vec<Iteration>,
    /// Queries staged for the round about to run; overwritten every round.
    pub next_queries: Vec<String>,
    /// Every URL successfully scraped, in fetch order. Not deduplicated:
    /// this is an audit trail of what was actually fetched.
    pub used_urls: Vec<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Whole-task summary, set once at the end.
    pub final_summary: Option<String>,
    /// Closing conclusion, set once at the end.
    pub conclusion: Option<String>,
    /// Last raw completion-judge response, kept for audit.
    pub completion_status_text: Option<String>,
    /// Filesystem slug all of this task's artifacts derive from.
    pub base_name: String,
}

impl ResearchTask {
    /// Create a fresh pending task.
    pub fn new(user_id: &str, initial_query: &str, plan: String, base_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            created_date: Utc::now().format("%Y-%m-%d").to_string(),
            initial_query: initial_query.to_string(),
            plan,
            iterations: Vec::new(),
            next_queries: Vec::new(),
            used_urls: Vec::new(),
            status: TaskStatus::Pending,
            final_summary: None,
            conclusion: None,
            completion_status_text: None,
            base_name,
        }
    }

    /// Append a completed round, assigning the next iteration number.
    ///
    /// Numbering is derived from the current length so that
    /// `iterations[i].number == i + 1` holds by construction.
    pub fn append_iteration(&mut self, results: Vec<QueryResult>, summary: String) {
        let number = self.iterations.len() as u32 + 1;
        self.iterations.push(Iteration {
            number,
            results,
            summary,
        });
    }
}

// ============= Error Types =============

/// Fatal and task-level error taxonomy.
///
/// Per-URL scrape failures are absorbed inside the collector and never
/// surface here; parse failures of model output fall back to safe
/// defaults and are logged, never raised.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Generation service transport or non-2xx failure. Fatal; no retry.
    #[error("generation service error: {0}")]
    Generation(String),

    /// Search service transport or non-2xx failure. Fatal.
    #[error("search service error: {0}")]
    Search(String),

    /// A whole iteration batch yielded zero items. Fatal.
    #[error("no results retrieved for iteration {0}")]
    NoResults(u32),

    /// Rejected user input (e.g. an empty query).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A research task is already in flight.
    #[error("research task already in progress")]
    TaskActive,

    /// Persistence or artifact I/O failure.
    #[error("state error: {0}")]
    State(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_iteration_numbers_from_one() {
        let mut task = ResearchTask::new("u1", "q", "plan".into(), "q".into());
        task.append_iteration(vec![], "first".into());
        task.append_iteration(vec![], "second".into());

        assert_eq!(task.iterations[0].number, 1);
        assert_eq!(task.iterations[1].number, 2);
        for (i, it) in task.iterations.iter().enumerate() {
            assert_eq!(it.number as usize, i + 1);
        }
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = ResearchTask::new("u1", "query", "plan".into(), "query".into());
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.iterations.is_empty());
        assert!(task.final_summary.is_none());
    }

    #[test]
    fn test_task_round_trips_through_json() {
        let mut task = ResearchTask::new("u1", "ai news", "1. search".into(), "ai_news".into());
        task.next_queries = vec!["ai news 2024".into()];
        task.used_urls = vec!["https://example.com/a".into()];
        task.append_iteration(
            vec![QueryResult {
                query: "ai news 2024".into(),
                url: "https://example.com/a".into(),
                title: "A".into(),
                summary: "s".into(),
            }],
            "round one".into(),
        );

        let json = serde_json::to_string(&task).unwrap();
        let back: ResearchTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.iterations.len(), 1);
        assert_eq!(back.iterations[0].results[0].url, "https://example.com/a");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Complete).unwrap(),
            "\"complete\""
        );
    }
}
