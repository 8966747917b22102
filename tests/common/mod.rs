//! Shared test helpers: a scripted generation client and config builders.

use async_trait::async_trait;
use delver::types::{AppError, Result};
use delver::{LLMClient, ResearchConfig};
use std::path::Path;

/// Generation client scripted by prompt-substring rules: the first rule
/// whose key appears in the prompt wins.
pub struct ScriptedClient {
    rules: Vec<(String, String)>,
}

impl ScriptedClient {
    pub fn new(rules: &[(&str, &str)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        for (key, response) in &self.rules {
            if prompt.contains(key.as_str()) {
                return Ok(response.clone());
            }
        }
        Err(AppError::Generation(format!(
            "no scripted response for prompt: {}",
            &prompt[..prompt.len().min(80)]
        )))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// A test config pointing at a wiremock server, with fast timings.
pub fn test_config(search_base: &str, data_dir: &Path) -> ResearchConfig {
    ResearchConfig {
        search_url: format!("{search_base}/search"),
        data_dir: data_dir.to_path_buf(),
        scrape_delay_ms: 0,
        fetch_timeout_secs: 5,
        max_iterations: 5,
        ..ResearchConfig::default()
    }
}
