//! Information sources and the registry the planner selects from.
//!
//! A [`Source`] is a named, described unit of work that can answer part
//! of a query. The actual I/O (vector index, web search, tabular query
//! engine) lives behind the [`SourceRunner`] trait and is supplied fully
//! formed before planning begins; the pipeline only selects, runs, and
//! aggregates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Budget, ChatMessage};
use crate::error::Error;

/// Closed set of source categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Retrieval over a pre-built document index.
    DocRetrieval,
    /// Live web/news search.
    WebSearch,
    /// Query against tabular data.
    TabularQuery,
}

impl SourceKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DocRetrieval => "doc_retrieval",
            Self::WebSearch => "web_search",
            Self::TabularQuery => "tabular_query",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface for running a source.
///
/// The initial state carries the reformulated query as a Chain-kind
/// message; the budget bounds outcome-producing work. Runners return a
/// Chain-kind outcome message, error-flagged on failure, or an [`Error`]
/// which the execution layer converts into one.
#[async_trait]
pub trait SourceRunner: Send + Sync {
    /// Runs the source against the initial state within the budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceExecution`] when the underlying engine fails.
    async fn run(&self, initial_state: &ChatMessage, budget: Budget) -> Result<ChatMessage, Error>;
}

/// A registered information source.
///
/// Registered once at startup; read-only thereafter.
#[derive(Clone)]
pub struct Source {
    name: String,
    description: String,
    kind: SourceKind,
    runner: Arc<dyn SourceRunner>,
}

impl Source {
    /// Creates a new source descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: SourceKind,
        runner: Arc<dyn SourceRunner>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            runner,
        }
    }

    /// Unique source name, the id the planner scores against.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description embedded in the planning prompt.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Source category.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The runner behind this source.
    #[must_use]
    pub fn runner(&self) -> Arc<dyn SourceRunner> {
        Arc::clone(&self.runner)
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registry of sources, keyed by unique name.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registers a source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSource`] when the name is already taken.
    pub fn register(&mut self, source: Source) -> Result<(), Error> {
        if self.contains(source.name()) {
            return Err(Error::DuplicateSource {
                name: source.name().to_string(),
            });
        }
        self.sources.push(source);
        Ok(())
    }

    /// All registered sources, in registration order.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Looks up a source by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Returns `true` if a source with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name() == name)
    }

    /// Number of registered sources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` when no source is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// One entry of an execution plan.
///
/// Created per planning cycle and consumed exactly once by the
/// execution layer; never persisted across calls.
#[derive(Debug, Clone)]
pub struct ExecutionUnit {
    /// Name of the source to run.
    pub source_name: String,
    /// Chain-kind message carrying the reformulated query.
    ///
    /// Identical text across all units of one plan.
    pub initial_state: ChatMessage,
    /// Budget shared by every unit in the plan.
    pub budget: Budget,
}
