//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend
///
/// Implementations translate the provider-neutral request into the vendor's
/// wire format and back.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short identifier used in logs (e.g. "groq")
    fn name(&self) -> &str;
}
