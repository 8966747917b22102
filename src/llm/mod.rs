//! Generation service clients.
//!
//! The orchestrator only ever sees the [`client::LLMClient`] trait;
//! [`ollama::OllamaClient`] is the single shipped implementation, speaking
//! the Ollama `/api/generate` wire protocol.

/// Client trait for text generation providers.
pub mod client;
/// Ollama `/api/generate` client.
pub mod ollama;

pub use client::LLMClient;
pub use ollama::OllamaClient;
