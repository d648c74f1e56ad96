//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`CompletionRequest`]/
//! [`CompletionResponse`] into provider-specific SDK calls. This keeps
//! all pipeline logic decoupled from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{CompletionRequest, CompletionResponse};
use crate::error::Error;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls) for a
/// specific provider while presenting a uniform interface to the
/// pipeline. No retry or timeout policy lives at this layer; callers
/// impose their own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Posts a chat completion request and returns all choices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Completion`] on API failures.
    async fn post_chat(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error>;
}
