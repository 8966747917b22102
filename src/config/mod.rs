//! Runtime configuration.
//!
//! Every policy threshold the orchestrator consults lives here, loaded
//! once from the environment and passed in at construction. Nothing in
//! the crate reads environment variables after startup.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::types::{AppError, Result};

/// Configuration value object for one orchestrator instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    /// Base URL of the Ollama-compatible generation service.
    pub ollama_url: String,
    /// Model name passed on every generation request.
    pub ollama_model: String,
    /// Base URL of the SearXNG-style search service.
    pub search_url: String,
    /// Hard cap on research rounds.
    pub max_iterations: u32,
    /// Cap on the number of queries staged per round.
    pub max_queries_per_batch: usize,
    /// Top-ranked result pages fetched per query.
    pub urls_per_query: usize,
    /// Character budget for extracted page text.
    pub max_content_chars: usize,
    /// Politeness delay between successive fetch dispatches, milliseconds.
    pub scrape_delay_ms: u64,
    /// Whether to check robots.txt before fetching a page.
    pub respect_robots: bool,
    /// Target length, in words, for per-page summaries.
    pub summary_words: usize,
    /// Timeout for a single generation call, seconds.
    pub generate_timeout_secs: u64,
    /// Timeout for a single page fetch, seconds.
    pub fetch_timeout_secs: u64,
    /// Re-ask a query that returned nothing through a refinement prompt.
    pub refine_empty_queries: bool,
    /// Total attempts per query when refinement is enabled.
    pub refine_attempts: usize,
    /// Directory holding task state, logs, and report artifacts.
    pub data_dir: PathBuf,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://127.0.0.1:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            search_url: "http://127.0.0.1:8888/search".to_string(),
            max_iterations: 5,
            max_queries_per_batch: 10,
            urls_per_query: 3,
            max_content_chars: 5000,
            scrape_delay_ms: 1000,
            respect_robots: true,
            summary_words: 200,
            generate_timeout_secs: 120,
            fetch_timeout_secs: 10,
            refine_empty_queries: false,
            refine_attempts: 2,
            data_dir: PathBuf::from("research"),
        }
    }
}

impl ResearchConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            search_url: env::var("SEARCH_URL").unwrap_or(defaults.search_url),
            max_iterations: parse_var("MAX_ITERATIONS", defaults.max_iterations)?,
            max_queries_per_batch: parse_var(
                "MAX_QUERIES_PER_BATCH",
                defaults.max_queries_per_batch,
            )?,
            urls_per_query: parse_var("URLS_PER_QUERY", defaults.urls_per_query)?,
            max_content_chars: parse_var("MAX_CONTENT_CHARS", defaults.max_content_chars)?,
            scrape_delay_ms: parse_var("SCRAPE_DELAY_MS", defaults.scrape_delay_ms)?,
            respect_robots: parse_var("RESPECT_ROBOTS_TXT", defaults.respect_robots)?,
            summary_words: parse_var("SUMMARY_WORDS", defaults.summary_words)?,
            generate_timeout_secs: parse_var(
                "GENERATE_TIMEOUT_SECS",
                defaults.generate_timeout_secs,
            )?,
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            refine_empty_queries: parse_var("REFINE_EMPTY_QUERIES", defaults.refine_empty_queries)?,
            refine_attempts: parse_var("REFINE_ATTEMPTS", defaults.refine_attempts)?,
            data_dir: env::var("RESEARCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("cannot parse {name}={raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = ResearchConfig::default();
        assert!(cfg.max_iterations >= 1);
        assert!(cfg.max_queries_per_batch >= 1);
        assert!(cfg.urls_per_query >= 1);
        assert!(cfg.respect_robots);
        assert!(!cfg.refine_empty_queries);
    }

    #[test]
    fn test_parse_var_falls_back_when_unset() {
        let value: u32 = parse_var("DELVER_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
