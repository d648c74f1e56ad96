//! Multi-source question answering with LLM-driven planning.
//!
//! `quorum_rs` answers a user query by consulting several registered
//! knowledge sources in one turn. A planning controller reformulates
//! the query against the conversational history and scores each
//! candidate source; the selected sources run concurrently under a
//! shared budget; surviving outcomes are collected with their
//! attribution and synthesized into a single research-report answer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quorum_rs::agent::{AgentConfig, Orchestrator, Source, SourceKind, SourceRegistry};
//! use quorum_rs::core::Budget;
//! # use quorum_rs::agent::SourceRunner;
//! # use quorum_rs::core::ChatMessage;
//! # use quorum_rs::error::Error;
//! # struct MyRunner;
//! # #[async_trait::async_trait]
//! # impl SourceRunner for MyRunner {
//! #     async fn run(&self, _s: &ChatMessage, _b: Budget) -> Result<ChatMessage, Error> {
//! #         Ok(ChatMessage::chain("ok"))
//! #     }
//! # }
//!
//! # async fn run() -> Result<(), quorum_rs::error::Error> {
//! let config = AgentConfig::from_env()?;
//!
//! let mut sources = SourceRegistry::new();
//! sources.register(Source::new(
//!     "docs",
//!     "the company's annual report",
//!     SourceKind::DocRetrieval,
//!     Arc::new(MyRunner),
//! ))?;
//!
//! let orchestrator = Orchestrator::from_config(config, sources)?;
//! let result = orchestrator.ask("What was the revenue growth?", Budget::default()).await?;
//! println!("{}", result.response.message.text());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod core;
pub mod error;
pub mod llm;

pub use crate::agent::{AgentConfig, Orchestrator, SourceRegistry, TurnResult};
pub use crate::core::{Budget, ChatHistory, ChatMessage, ScoredChatMessage};
pub use crate::error::Error;
