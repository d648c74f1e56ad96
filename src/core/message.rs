//! Conversation messages, history, and scored results.
//!
//! [`ChatMessage`] is immutable once created; [`ChatHistory`] is
//! append-only. Both invariants are enforced by keeping fields private
//! and exposing only constructors and read accessors.

use serde::{Deserialize, Serialize};

/// Kind of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageKind {
    /// A user turn.
    User,
    /// An agent (final answer) turn.
    Agent,
    /// A message produced by or addressed to a source runner.
    Chain,
}

/// A single immutable chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    kind: ChatMessageKind,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default)]
    is_error: bool,
}

impl ChatMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::User,
            text: text.into(),
            source: None,
            is_error: false,
        }
    }

    /// Creates an agent message.
    #[must_use]
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::Agent,
            text: text.into(),
            source: None,
            is_error: false,
        }
    }

    /// Creates an agent message attributed to a source.
    #[must_use]
    pub fn agent_from_source(
        text: impl Into<String>,
        source: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            kind: ChatMessageKind::Agent,
            text: text.into(),
            source: Some(source.into()),
            is_error,
        }
    }

    /// Creates a chain message (shared initial state for a source run).
    #[must_use]
    pub fn chain(text: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::Chain,
            text: text.into(),
            source: None,
            is_error: false,
        }
    }

    /// Creates a chain message attributed to a source.
    #[must_use]
    pub fn chain_from_source(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::Chain,
            text: text.into(),
            source: Some(source.into()),
            is_error: false,
        }
    }

    /// Creates an error-flagged chain message for a failed source run.
    #[must_use]
    pub fn chain_error(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::Chain,
            text: text.into(),
            source: Some(source.into()),
            is_error: true,
        }
    }

    /// The message kind.
    #[must_use]
    pub const fn kind(&self) -> ChatMessageKind {
        self.kind
    }

    /// Returns `true` if the message is of the given kind.
    #[must_use]
    pub fn is_of_kind(&self, kind: ChatMessageKind) -> bool {
        self.kind == kind
    }

    /// The message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The originating source id, when attributed.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns `true` if the message is flagged as an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Returns `true` if the message completed without error.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !self.is_error
    }
}

/// Ordered, append-only log of conversation turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Creates a history seeded with a single user message.
    #[must_use]
    pub fn from_user_message(text: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.add_user_message(text);
        history
    }

    /// Appends a user turn.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    /// Appends an agent turn.
    pub fn add_agent_message(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::agent(text));
    }

    /// Appends an already-built message.
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent user message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_of_kind(ChatMessageKind::User))
    }

    /// Number of messages in the history.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the history holds no messages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A message paired with a selection score.
///
/// Produced by the outcome collector (fixed score 1.0 per surviving
/// source) and by the synthesizer (the final answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChatMessage {
    /// The scored message.
    pub message: ChatMessage,
    /// Selection score.
    pub score: f64,
}

impl ScoredChatMessage {
    /// Pairs a message with a score.
    #[must_use]
    pub const fn new(message: ChatMessage, score: f64) -> Self {
        Self { message, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.kind(), ChatMessageKind::User);
        assert_eq!(msg.text(), "hello");
        assert!(msg.source().is_none());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_chain_error_message() {
        let msg = ChatMessage::chain_error("boom", "search");
        assert_eq!(msg.kind(), ChatMessageKind::Chain);
        assert!(msg.is_error());
        assert_eq!(msg.source(), Some("search"));
    }

    #[test]
    fn test_agent_from_source() {
        let msg = ChatMessage::agent_from_source("answer", "docs", false);
        assert!(msg.is_of_kind(ChatMessageKind::Agent));
        assert_eq!(msg.source(), Some("docs"));
        assert!(!msg.is_error());
    }

    #[test]
    fn test_history_append_order() {
        let mut history = ChatHistory::new();
        history.add_user_message("q1");
        history.add_agent_message("a1");
        history.add_user_message("q2");
        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[1].text(), "a1");
        assert_eq!(
            history.last_user_message().map(ChatMessage::text),
            Some("q2")
        );
    }

    #[test]
    fn test_last_user_message_skips_agent_turns() {
        let mut history = ChatHistory::from_user_message("q1");
        history.add_agent_message("a1");
        assert_eq!(
            history.last_user_message().map(ChatMessage::text),
            Some("q1")
        );
    }

    #[test]
    fn test_empty_history() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
        assert!(history.last_user_message().is_none());
    }

    #[test]
    fn test_message_serialization() {
        let msg = ChatMessage::user("test");
        let json = serde_json::to_string(&msg).unwrap_or_default();
        assert!(json.contains("\"user\""));
        // source should be omitted when None
        assert!(!json.contains("source"));
    }

    #[test]
    fn test_scored_message() {
        let scored = ScoredChatMessage::new(ChatMessage::agent("final"), 1.0);
        assert!((scored.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(scored.message.text(), "final");
    }
}
