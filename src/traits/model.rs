//! Language-model backend trait.
//!
//! The classifier and site validator consume the model as an untrusted
//! oracle: they send a text prompt and get free text back, which may or
//! may not contain the JSON object they asked for. All response parsing
//! and fail-closed handling lives on the caller side; implementations
//! only move bytes.

use async_trait::async_trait;

use crate::error::ModelResult;

/// A text-in, text-out LLM backend.
///
/// Implementations wrap specific providers (Gemini, OpenAI, ...) and map
/// provider rate-limit signals to [`ModelError::RateLimited`] so callers
/// can apply their retry policy.
///
/// [`ModelError::RateLimited`]: crate::error::ModelError::RateLimited
#[async_trait]
pub trait Model: Send + Sync {
    /// Send `prompt` and return the raw response text.
    async fn complete(&self, prompt: &str) -> ModelResult<String>;
}

#[async_trait]
impl<M: Model + ?Sized> Model for std::sync::Arc<M> {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        (**self).complete(prompt).await
    }
}
