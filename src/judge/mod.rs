//! Continue-vs-stop policy.
//!
//! Asks the model whether the accumulated iteration history answers the
//! initial query. This is a policy decision, not a deterministic
//! function: the same history may yield different answers on different
//! runs, and callers must not assume idempotence.

use crate::llm::LLMClient;
use crate::parse::{self, Decision};
use crate::types::{ResearchTask, Result};
use std::sync::Arc;

/// Decides whether research should continue from task history.
pub struct CompletionJudge {
    llm: Arc<dyn LLMClient>,
}

impl CompletionJudge {
    /// Create a judge over the shared generation client.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Judge the task, returning the decision and the raw response text
    /// for audit.
    ///
    /// An unparsable response falls back to [`Decision::Complete`] —
    /// terminating beats looping forever on garbage — and is logged
    /// distinctly from a genuine model-asserted completion.
    pub async fn judge(&self, task: &ResearchTask) -> Result<(Decision, String)> {
        let iterations_json = serde_json::to_string_pretty(&task.iterations).unwrap_or_default();
        let prompt = format!(
            "Current date: {date}\n\
             Decide whether this research task has gathered enough information.\n\
             Initial query: {query}\n\
             Plan:\n{plan}\n\
             Rounds and results:\n{iterations_json}\n\
             Answer with a single digit:\n\
             1 - more research is needed\n\
             2 - the research is complete\n\
             Start your answer with the digit, optionally followed by a short reason.",
            date = task.created_date,
            query = task.initial_query,
            plan = task.plan,
        );

        let raw = self.llm.generate(&prompt).await?.trim().to_string();
        let decision = match parse::parse_decision(&raw) {
            Some(decision) => {
                tracing::info!(?decision, "completion decision");
                decision
            }
            None => {
                tracing::warn!(
                    decision_fallback = true,
                    raw,
                    "unparsable completion decision, defaulting to complete"
                );
                Decision::Complete
            }
        };

        Ok((decision, raw))
    }
}
