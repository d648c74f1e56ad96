//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple pipeline logic from any specific LLM SDK,
//! allowing the same components to work across `OpenAI`-compatible
//! backends.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// A single message sent to the completion interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<LlmMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A chat completion response (provider-agnostic).
///
/// Providers may return several choices; the pipeline always reads the
/// first one via [`CompletionResponse::first_choice`].
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Generated text, one entry per choice.
    pub choices: Vec<String>,
    /// Token usage statistics.
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// The first choice's text, or an empty string if none was returned.
    #[must_use]
    pub fn first_choice(&self) -> &str {
        self.choices.first().map_or("", String::as_str)
    }
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> LlmMessage {
    LlmMessage {
        role: Role::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> LlmMessage {
    LlmMessage {
        role: Role::User,
        content: content.to_string(),
    }
}
