//! Response synthesizer.
//!
//! Builds an aggregation context from the collected, source-attributed
//! outcomes, asks the model to merge them into one report, and wraps
//! the result as the turn's final answer.

use std::fmt::Write;
use std::sync::Arc;

use tracing::debug;

use super::config::{AgentConfig, SourceAttribution};
use super::prompt::build_synthesis_prompt;
use super::source::SourceRegistry;
use crate::core::{ChatMessage, ScoredChatMessage};
use crate::error::Error;
use crate::llm::message::{CompletionRequest, TokenUsage, system_message, user_message};
use crate::llm::provider::LlmProvider;

/// Estimated characters per token, for the context cap.
const CHARS_PER_TOKEN: usize = 4;

/// Synthesizes collected outcomes into a single attributed report.
pub struct ResponseSynthesizer {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    system_prompt: String,
}

impl ResponseSynthesizer {
    /// Creates a new synthesizer with the given provider, configuration,
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

    /// Merges the collected outcomes into one final answer.
    ///
    /// With no collected outcomes the context body is empty but the
    /// call still proceeds — the model is expected to state it found no
    /// information.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Completion`] when the completion interface fails.
    pub async fn synthesize(
        &self,
        collected: &[ScoredChatMessage],
        sources: &SourceRegistry,
        original_query: &str,
    ) -> Result<(ScoredChatMessage, TokenUsage), Error> {
        let context = self.build_context(collected, sources);
        let prompt = build_synthesis_prompt(&context, original_query);

        let request = CompletionRequest {
            model: self.config.synthesizer_model.clone(),
            messages: vec![system_message(&self.system_prompt), user_message(&prompt)],
            temperature: Some(0.1),
            max_tokens: Some(self.config.synthesizer_max_tokens),
        };

        let response = self.provider.post_chat(&request).await?;
        debug!(
            outcomes = collected.len(),
            "synthesis completion received"
        );

        let answer = ScoredChatMessage::new(ChatMessage::agent(response.first_choice()), 1.0);
        Ok((answer, response.usage))
    }

    /// Concatenates one attribution block per collected outcome.
    ///
    /// Blocks are separated by blank lines and added in order until the
    /// configured context token limit would be exceeded; higher-ranked
    /// sources come first, so they are the ones that survive the cap.
    fn build_context(&self, collected: &[ScoredChatMessage], sources: &SourceRegistry) -> String {
        let char_limit = self.config.context_token_limit.saturating_mul(CHARS_PER_TOKEN);
        let mut context = String::new();

        for outcome in collected {
            let block = match self.config.attribution {
                SourceAttribution::Description => {
                    let description = outcome
                        .message
                        .source()
                        .and_then(|name| sources.get(name))
                        .map_or_else(
                            || outcome.message.source().unwrap_or("unknown source").to_string(),
                            |source| source.description().to_string(),
                        );
                    format!(
                        "Source: {description}\nResponse: {}\n\n",
                        outcome.message.text()
                    )
                }
                SourceAttribution::RawText => {
                    format!("Response: {}\n\n", outcome.message.text())
                }
            };

            if context.len() + block.len() > char_limit {
                debug!("context token limit reached, truncating remaining outcomes");
                break;
            }
            let _ = write!(context, "{block}");
        }

        context
    }
}

impl std::fmt::Debug for ResponseSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSynthesizer")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::agent::source::{Source, SourceKind, SourceRunner};
    use crate::core::{Budget, ChatMessageKind};
    use crate::llm::message::CompletionResponse;

    struct NoopRunner;

    #[async_trait]
    impl SourceRunner for NoopRunner {
        async fn run(&self, _state: &ChatMessage, _budget: Budget) -> Result<ChatMessage, Error> {
            Ok(ChatMessage::chain("noop"))
        }
    }

    struct EchoPromptProvider;

    #[async_trait]
    impl LlmProvider for EchoPromptProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn post_chat(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, Error> {
            // echo the user prompt back so tests can inspect the context
            let prompt = request
                .messages
                .last()
                .map_or_else(String::new, |m| m.content.clone());
            Ok(CompletionResponse {
                choices: vec![prompt],
                usage: TokenUsage::default(),
            })
        }
    }

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry
            .register(Source::new(
                "docs",
                "the 10-K annual report",
                SourceKind::DocRetrieval,
                Arc::new(NoopRunner),
            ))
            .unwrap_or_else(|_| unreachable!());
        registry
    }

    fn synthesizer(config: AgentConfig) -> ResponseSynthesizer {
        ResponseSynthesizer::new(Arc::new(EchoPromptProvider), config, "system".to_string())
    }

    fn config() -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn collected_outcome(text: &str) -> ScoredChatMessage {
        ScoredChatMessage::new(ChatMessage::agent_from_source(text, "docs", false), 1.0)
    }

    #[tokio::test]
    async fn test_context_attributes_by_description() {
        let synth = synthesizer(config());
        let (answer, _) = synth
            .synthesize(&[collected_outcome("revenue grew 7%")], &registry(), "query")
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(answer.message.kind(), ChatMessageKind::Agent);
        assert!(answer.message.text().contains("Source: the 10-K annual report"));
        assert!(answer.message.text().contains("Response: revenue grew 7%"));
    }

    #[tokio::test]
    async fn test_context_raw_text_variant() {
        let config = AgentConfig::builder()
            .api_key("test")
            .attribution(SourceAttribution::RawText)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let synth = synthesizer(config);
        let (answer, _) = synth
            .synthesize(&[collected_outcome("revenue grew 7%")], &registry(), "query")
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(!answer.message.text().contains("Source:"));
        assert!(answer.message.text().contains("Response: revenue grew 7%"));
    }

    #[tokio::test]
    async fn test_empty_outcomes_still_calls_model() {
        let synth = synthesizer(config());
        let (answer, _) = synth
            .synthesize(&[], &registry(), "the query")
            .await
            .unwrap_or_else(|_| unreachable!());

        // the prompt went out with an empty context body
        assert!(answer.message.text().contains("# Query:\nthe query"));
        assert!((answer.score - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_context_capped_by_token_limit() {
        let config = AgentConfig::builder()
            .api_key("test")
            .context_token_limit(20)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let synth = synthesizer(config);

        let outcomes = vec![
            collected_outcome("first block fits"),
            collected_outcome(&"x".repeat(500)),
        ];
        let context = synth.build_context(&outcomes, &registry());
        assert!(context.contains("first block fits"));
        assert!(!context.contains("xxxx"));
    }

    #[tokio::test]
    async fn test_score_fixed_at_one() {
        let synth = synthesizer(config());
        let (answer, _) = synth
            .synthesize(&[collected_outcome("data")], &registry(), "q")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!((answer.score - 1.0).abs() < f64::EPSILON);
    }
}
