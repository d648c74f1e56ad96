//! LLM completion layer.
//!
//! Provider-agnostic message types plus a pluggable [`LlmProvider`]
//! trait backed by OpenAI-compatible APIs. The pipeline components only
//! depend on the trait, never on a concrete SDK.

pub mod client;
pub mod message;
pub mod provider;
pub mod providers;

pub use client::create_provider;
pub use message::{CompletionRequest, CompletionResponse, LlmMessage, Role, TokenUsage};
pub use provider::LlmProvider;
