//! Orchestrator for the plan/execute/collect/synthesize pipeline.
//!
//! Coordinates the full turn: planning → concurrent source execution →
//! outcome collection → attributed synthesis.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::config::AgentConfig;
use super::controller::PlanningController;
use super::evaluator::OutcomeCollector;
use super::executor::ExecutionLayer;
use super::prompt::PromptSet;
use super::source::SourceRegistry;
use super::synthesizer::ResponseSynthesizer;
use crate::core::{Budget, ChatHistory, ScoredChatMessage};
use crate::error::Error;
use crate::llm::client::create_provider;
use crate::llm::provider::LlmProvider;

/// Final result of one orchestrated turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    /// The synthesized answer.
    pub response: ScoredChatMessage,
    /// The query after reformulation against the history.
    pub reformulated_query: String,
    /// Names of the sources the plan selected, in rank order.
    pub selected_sources: Vec<String>,
    /// Number of selected sources whose outcome survived collection.
    pub sources_succeeded: usize,
    /// Number of selected sources that failed or timed out.
    pub sources_failed: usize,
    /// Total tokens consumed across planning and synthesis.
    pub total_tokens: u32,
    /// Total elapsed time.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}

/// Orchestrates the multi-source question-answering pipeline.
///
/// Coordinates planning, concurrent source execution, outcome
/// collection, and synthesis into a single turn.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    sources: SourceRegistry,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider, configuration,
    /// and source registry.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        sources: SourceRegistry,
    ) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            config,
            sources,
            prompts,
        }
    }

    /// Creates an orchestrator with a provider resolved from the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProvider`] when the configured
    /// provider name is not recognized.
    pub fn from_config(config: AgentConfig, sources: SourceRegistry) -> Result<Self, Error> {
        let provider = Arc::from(create_provider(&config)?);
        Ok(Self::new(provider, config, sources))
    }

    /// Executes one full turn against the conversational history.
    ///
    /// # Steps
    ///
    /// 1. Plan: reformulate the query and score candidate sources
    /// 2. Execute the selected sources concurrently under the budget
    /// 3. Collect the outcomes that completed cleanly
    /// 4. Synthesize the collected outcomes into one attributed answer
    ///
    /// An empty plan is not an error: the pipeline proceeds to synthesis
    /// with no collected outcomes, and the model states it found nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Orchestration`] when the history holds no user
    /// message or the query fails validation, or [`Error::Completion`]
    /// when a completion call fails.
    pub async fn execute(&self, history: &ChatHistory, budget: Budget) -> Result<TurnResult, Error> {
        const MAX_QUERY_LEN: usize = 10_000;

        let query = history
            .last_user_message()
            .ok_or_else(|| Error::Orchestration {
                message: "Turn requires at least one user message".to_string(),
            })?
            .text()
            .to_string();

        if query.trim().is_empty() {
            return Err(Error::Orchestration {
                message: "Query cannot be empty".to_string(),
            });
        }

        if query.len() > MAX_QUERY_LEN {
            return Err(Error::Orchestration {
                message: format!(
                    "Query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                    query.len()
                ),
            });
        }

        let start = Instant::now();

        // Step 1: Plan
        let controller = PlanningController::new(
            Arc::clone(&self.provider),
            self.config.clone(),
            self.prompts.controller.clone(),
        );
        let plan = controller.plan(history, &self.sources, budget).await?;
        debug!(selected = ?plan.selected, "plan ready");

        // Steps 2 and 3: Execute and collect
        let collected = if plan.is_empty() {
            Vec::new()
        } else {
            let layer = ExecutionLayer::new(self.config.max_concurrency);
            let outcomes = layer.execute(&self.sources, &plan).await;
            OutcomeCollector::new().collect(&outcomes, &plan.selected)
        };

        let sources_succeeded = collected.len();
        let sources_failed = plan.selected.len().saturating_sub(sources_succeeded);

        // Step 4: Synthesize around the original user query; the
        // reformulation only drives source execution
        let synthesizer = ResponseSynthesizer::new(
            Arc::clone(&self.provider),
            self.config.clone(),
            self.prompts.synthesizer.clone(),
        );
        let (response, synth_usage) = synthesizer
            .synthesize(&collected, &self.sources, &query)
            .await?;

        let total_tokens = plan
            .usage
            .total_tokens
            .saturating_add(synth_usage.total_tokens);

        Ok(TurnResult {
            response,
            reformulated_query: plan.reformulated_query,
            selected_sources: plan.selected,
            sources_succeeded,
            sources_failed,
            total_tokens,
            elapsed: start.elapsed(),
        })
    }

    /// Executes one turn for a standalone query with no prior history.
    ///
    /// # Errors
    ///
    /// Same as [`Orchestrator::execute`].
    pub async fn ask(&self, query: &str, budget: Budget) -> Result<TurnResult, Error> {
        let history = ChatHistory::from_user_message(query);
        self.execute(&history, budget).await
    }

    /// The registered sources.
    #[must_use]
    pub const fn sources(&self) -> &SourceRegistry {
        &self.sources
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}
