//! Condensation prompts over the generation client.
//!
//! Thin drivers with fixed prompt shapes: one page, one research round,
//! and the whole task. All errors from the client propagate unchanged;
//! nothing here retries.

use crate::llm::LLMClient;
use crate::types::{Iteration, QueryResult, Result};
use std::sync::Arc;

/// Drives [`LLMClient`] to condense scraped content at three granularities.
pub struct Summarizer {
    llm: Arc<dyn LLMClient>,
    summary_words: usize,
}

impl Summarizer {
    /// Create a summarizer targeting `summary_words` per page summary.
    pub fn new(llm: Arc<dyn LLMClient>, summary_words: usize) -> Self {
        Self { llm, summary_words }
    }

    /// Condense a single scraped page in the context of its query.
    pub async fn summarize_page(&self, query: &str, content: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following page content for the search query \"{query}\":\n\
             {content}\n\
             Provide a concise summary of at most {words} words in the same language \
             as the query.",
            words = self.summary_words,
        );
        Ok(self.llm.generate(&prompt).await?.trim().to_string())
    }

    /// Condense one research round's item summaries into a batch summary.
    pub async fn summarize_batch(&self, results: &[QueryResult]) -> Result<String> {
        let items: Vec<&str> = results.iter().map(|r| r.summary.as_str()).collect();
        let items_json = serde_json::to_string_pretty(&items).unwrap_or_default();
        let prompt = format!(
            "Combine the following summaries gathered during one research round into \
             a single coherent summary of at most {words} words:\n{items_json}",
            words = self.summary_words * 2,
        );
        Ok(self.llm.generate(&prompt).await?.trim().to_string())
    }

    /// Produce the whole-task narrative summary, once, at the end.
    pub async fn summarize_task(
        &self,
        initial_query: &str,
        plan: &str,
        iterations: &[Iteration],
    ) -> Result<String> {
        let iterations_json = serde_json::to_string_pretty(iterations).unwrap_or_default();
        let prompt = format!(
            "Summarize the completed research task.\n\
             Initial query: {initial_query}\n\
             Plan:\n{plan}\n\
             Rounds and results:\n{iterations_json}\n\
             Provide a comprehensive summary in the same language as the query."
        );
        Ok(self.llm.generate(&prompt).await?.trim().to_string())
    }

    /// Produce the report's closing conclusion from the final summary.
    pub async fn conclude(
        &self,
        current_date: &str,
        initial_query: &str,
        plan: &str,
        iterations: &[Iteration],
        final_summary: &str,
    ) -> Result<String> {
        let iterations_json = serde_json::to_string_pretty(iterations).unwrap_or_default();
        let prompt = format!(
            "Provide a brief conclusion for the research report.\n\
             Current date: {current_date}\n\
             Initial query: {initial_query}\n\
             Plan:\n{plan}\n\
             Rounds and results:\n{iterations_json}\n\
             Final summary:\n{final_summary}\n\
             A few sentences, in the same language as the query, no preamble."
        );
        Ok(self.llm.generate(&prompt).await?.trim().to_string())
    }
}
