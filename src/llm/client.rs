//! Generation client abstraction.

use crate::types::Result;
use async_trait::async_trait;

/// Generic text-generation client trait.
///
/// One prompt in, one completion out. Calls are awaited one at a time by
/// every caller in this crate; the trait makes no idempotence or retry
/// promises, and implementations must not retry on failure — the caller
/// decides whether a failure is fatal.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion for a prompt.
    ///
    /// Fails with [`crate::types::AppError::Generation`] on transport or
    /// non-2xx failure.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// The model identifier sent with every request.
    fn model_name(&self) -> &str;
}
