//! Multi-source question-answering pipeline.
//!
//! An LLM-powered workflow that plans which knowledge sources to
//! consult, runs them concurrently, and synthesizes their outcomes
//! into a single attributed answer.
//!
//! # Architecture
//!
//! ```text
//! User query → Orchestrator
//!   ├── PlanningController (reformulates query, scores sources)
//!   ├── Fan-out → N concurrent SourceRunners under one Budget
//!   │   └── Each produces a Chain outcome (or an error-flagged one)
//!   ├── OutcomeCollector (keeps clean outcomes, tags attribution)
//!   └── ResponseSynthesizer → final attributed answer
//! ```

pub mod config;
pub mod controller;
pub mod evaluator;
pub mod executor;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod source;
pub mod synthesizer;

// Re-export key types
pub use config::{AgentConfig, AgentConfigBuilder, SourceAttribution};
pub use controller::{Plan, PlanningController};
pub use evaluator::OutcomeCollector;
pub use executor::ExecutionLayer;
pub use orchestrator::{Orchestrator, TurnResult};
pub use parser::{ParsedPlanResponse, ScoredSource};
pub use prompt::PromptSet;
pub use source::{ExecutionUnit, Source, SourceKind, SourceRegistry, SourceRunner};
pub use synthesizer::ResponseSynthesizer;
