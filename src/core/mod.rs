//! Core data structures shared across the pipeline.
//!
//! These types have no dependency on the LLM layer or the async runtime,
//! so pure components (parsing, collection) stay synchronous and testable.

pub mod budget;
pub mod message;

pub use budget::Budget;
pub use message::{ChatHistory, ChatMessage, ChatMessageKind, ScoredChatMessage};
