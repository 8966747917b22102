//! Ollama client over the raw `/api/generate` endpoint.
//!
//! Streaming is never consumed: every request sets `stream: false` and
//! reads the single `response` field. Prompts and raw responses are
//! logged verbatim for offline audit — they may contain user-identifying
//! text, an accepted tradeoff for debuggability.

use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking (awaited) request/response wrapper around one Ollama model.
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:11434`)
    /// with a fixed per-request timeout.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Generation(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!(model = %self.model, prompt, "generation request");

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "ollama returned {status}: {detail}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("malformed ollama response: {e}")))?;

        tracing::info!(model = %self.model, response = %parsed.response, "generation response");
        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
