//! Planning controller.
//!
//! Turns a user turn into an ordered execution plan: builds the
//! two-subtask prompt from the conversational history and the candidate
//! sources, invokes the completion interface, parses the response, and
//! filters/ranks the scored sources into [`ExecutionUnit`]s.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use super::config::AgentConfig;
use super::parser::{self, ScoredSource};
use super::prompt::{build_plan_prompt, render_chat_history, render_source_choices};
use super::source::{ExecutionUnit, SourceRegistry};
use crate::core::{Budget, ChatHistory, ChatMessage};
use crate::error::Error;
use crate::llm::message::{CompletionRequest, TokenUsage, system_message, user_message};
use crate::llm::provider::LlmProvider;

/// An ordered execution plan for one turn.
///
/// `selected` records which source names made the cut in this planning
/// cycle; the collector uses it to restrict aggregation to outcomes
/// produced in the current cycle.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Execution units in rank order, at most `top_k` of them.
    pub units: Vec<ExecutionUnit>,
    /// Names of the sources selected in this cycle, same order as `units`.
    pub selected: Vec<String>,
    /// The reformulated user query shared by every unit.
    pub reformulated_query: String,
    /// Token usage of the planning call.
    pub usage: TokenUsage,
}

impl Plan {
    /// A plan selecting nothing — a valid terminal state, not an error.
    #[must_use]
    pub const fn empty(usage: TokenUsage) -> Self {
        Self {
            units: Vec::new(),
            selected: Vec::new(),
            reformulated_query: String::new(),
            usage,
        }
    }

    /// Returns `true` when no source was selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Controller that uses an LLM to decide the execution plan and
/// reformulate the user query based on the conversational history.
pub struct PlanningController {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    system_prompt: String,
}

impl PlanningController {
    /// Creates a new controller with the given provider, configuration,
    /// and system prompt.
    #[must_use]
    pub const fn new(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        system_prompt: String,
    ) -> Self {
        Self {
            provider,
            config,
            system_prompt,
        }
    }

    /// Generates an execution plan for the current user turn.
    ///
    /// A completion that cannot be split into its two segments soft-fails
    /// to an empty plan; so does a response in which no source strictly
    /// exceeds the threshold. An already-exhausted budget yields an empty
    /// plan without calling the model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Orchestration`] when the history holds no user
    /// message, or [`Error::Completion`] when the completion interface
    /// itself fails.
    pub async fn plan(
        &self,
        history: &ChatHistory,
        sources: &SourceRegistry,
        budget: Budget,
    ) -> Result<Plan, Error> {
        let query = history
            .last_user_message()
            .ok_or_else(|| Error::Orchestration {
                message: "planning requires at least one user message".to_string(),
            })?
            .text()
            .to_string();

        if budget.is_expired() {
            debug!("budget exhausted before planning, emitting empty plan");
            return Ok(Plan::empty(TokenUsage::default()));
        }

        let prompt = build_plan_prompt(
            &render_chat_history(history, self.config.history_window),
            &query,
            &render_source_choices(sources),
            self.config.score_justification,
        );

        let request = CompletionRequest {
            model: self.config.controller_model.clone(),
            messages: vec![system_message(&self.system_prompt), user_message(&prompt)],
            temperature: Some(0.0),
            max_tokens: Some(self.config.controller_max_tokens),
        };

        let response = self.provider.post_chat(&request).await?;
        let completion = response.first_choice();
        debug!(completion, "controller completion received");

        let parsed = match parser::parse_plan_response(completion) {
            Ok(parsed) => parsed,
            Err(e) => {
                // fatal to this planning cycle only: surface an empty plan
                debug!(error = %e, "malformed planning response, emitting empty plan");
                return Ok(Plan::empty(response.usage));
            }
        };

        let scored: Vec<ScoredSource> = parsed
            .score_lines
            .iter()
            .filter_map(|line| parser::parse_score_line(line, sources))
            .collect();

        let selected = select_candidates(scored, self.config.threshold, self.config.top_k);
        if selected.is_empty() {
            return Ok(Plan::empty(response.usage));
        }

        let units = selected
            .iter()
            .map(|candidate| ExecutionUnit {
                source_name: candidate.name.clone(),
                initial_state: ChatMessage::chain(parsed.reformulated_query.clone()),
                budget,
            })
            .collect();

        Ok(Plan {
            units,
            selected: selected.into_iter().map(|c| c.name).collect(),
            reformulated_query: parsed.reformulated_query,
            usage: response.usage,
        })
    }
}

impl std::fmt::Debug for PlanningController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanningController")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Filters, ranks, and caps the scored sources.
///
/// Keeps entries whose score strictly exceeds `threshold`, sorts by
/// score descending (stable: ties keep their original line order), and
/// truncates to the first `top_k`.
fn select_candidates(
    scored: Vec<ScoredSource>,
    threshold: f64,
    top_k: usize,
) -> Vec<ScoredSource> {
    let mut candidates: Vec<ScoredSource> = scored
        .into_iter()
        .filter(|s| s.score > threshold)
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(top_k);
    candidates
}
