//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;

use crate::error::Error;

/// Default minimum score a source must strictly exceed to be planned.
const DEFAULT_THRESHOLD: f64 = 5.0;
/// Default plan length cap, one slot per built-in source kind.
const DEFAULT_TOP_K: usize = 3;
/// Default number of prior turns rendered into the planning prompt.
const DEFAULT_HISTORY_WINDOW: usize = 4;
/// Default cap on the synthesis context body, in tokens.
const DEFAULT_CONTEXT_TOKEN_LIMIT: usize = 3000;
/// Default maximum concurrent source runs.
const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default controller max tokens.
const DEFAULT_CONTROLLER_MAX_TOKENS: u32 = 1024;
/// Default synthesizer max tokens.
const DEFAULT_SYNTHESIZER_MAX_TOKENS: u32 = 4096;

/// How the synthesizer attributes collected outcomes in its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceAttribution {
    /// Prefix each outcome with the registered source description.
    #[default]
    Description,
    /// Include the raw outcome text only.
    RawText,
}

/// Configuration for the orchestrator and its components.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the planning controller.
    pub controller_model: String,
    /// Model for the response synthesizer.
    pub synthesizer_model: String,
    /// Minimum score (exclusive) a source must exceed to enter the plan.
    pub threshold: f64,
    /// Maximum number of execution units in a plan.
    pub top_k: usize,
    /// Number of prior turns rendered into the planning prompt.
    pub history_window: usize,
    /// Cap on the synthesis context body, in tokens (~4 chars each).
    pub context_token_limit: usize,
    /// Maximum concurrent source runs.
    pub max_concurrency: usize,
    /// Maximum tokens for controller responses.
    pub controller_max_tokens: u32,
    /// Maximum tokens for synthesizer responses.
    pub synthesizer_max_tokens: u32,
    /// Whether the plan prompt asks for a justification field on score lines.
    ///
    /// The parser tolerates trailing fields either way; this only changes
    /// the format instruction sent to the model.
    pub score_justification: bool,
    /// How the synthesizer attributes collected outcomes.
    pub attribution: SourceAttribution,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for any missing
    /// files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, Error> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    controller_model: Option<String>,
    synthesizer_model: Option<String>,
    threshold: Option<f64>,
    top_k: Option<usize>,
    history_window: Option<usize>,
    context_token_limit: Option<usize>,
    max_concurrency: Option<usize>,
    controller_max_tokens: Option<u32>,
    synthesizer_max_tokens: Option<u32>,
    score_justification: Option<bool>,
    attribution: Option<SourceAttribution>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("QUORUM_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("QUORUM_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("QUORUM_BASE_URL"))
                .ok();
        }
        if self.controller_model.is_none() {
            self.controller_model = std::env::var("QUORUM_CONTROLLER_MODEL").ok();
        }
        if self.synthesizer_model.is_none() {
            self.synthesizer_model = std::env::var("QUORUM_SYNTHESIZER_MODEL").ok();
        }
        if self.threshold.is_none() {
            self.threshold = std::env::var("QUORUM_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("QUORUM_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.history_window.is_none() {
            self.history_window = std::env::var("QUORUM_HISTORY_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = std::env::var("QUORUM_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("QUORUM_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the controller model.
    #[must_use]
    pub fn controller_model(mut self, model: impl Into<String>) -> Self {
        self.controller_model = Some(model.into());
        self
    }

    /// Sets the synthesizer model.
    #[must_use]
    pub fn synthesizer_model(mut self, model: impl Into<String>) -> Self {
        self.synthesizer_model = Some(model.into());
        self
    }

    /// Sets the selection threshold (exclusive).
    #[must_use]
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Sets the plan length cap.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Sets the history window.
    #[must_use]
    pub const fn history_window(mut self, n: usize) -> Self {
        self.history_window = Some(n);
        self
    }

    /// Sets the synthesis context token limit.
    #[must_use]
    pub const fn context_token_limit(mut self, n: usize) -> Self {
        self.context_token_limit = Some(n);
        self
    }

    /// Sets the maximum concurrency.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the controller max tokens.
    #[must_use]
    pub const fn controller_max_tokens(mut self, n: u32) -> Self {
        self.controller_max_tokens = Some(n);
        self
    }

    /// Sets the synthesizer max tokens.
    #[must_use]
    pub const fn synthesizer_max_tokens(mut self, n: u32) -> Self {
        self.synthesizer_max_tokens = Some(n);
        self
    }

    /// Sets whether score lines should carry a justification field.
    #[must_use]
    pub const fn score_justification(mut self, enabled: bool) -> Self {
        self.score_justification = Some(enabled);
        self
    }

    /// Sets the synthesis attribution mode.
    #[must_use]
    pub const fn attribution(mut self, attribution: SourceAttribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, Error> {
        let api_key = self.api_key.ok_or(Error::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            controller_model: self.controller_model.unwrap_or_else(|| "gpt-4o".to_string()),
            synthesizer_model: self
                .synthesizer_model
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            history_window: self.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW),
            context_token_limit: self
                .context_token_limit
                .unwrap_or(DEFAULT_CONTEXT_TOKEN_LIMIT),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            controller_max_tokens: self
                .controller_max_tokens
                .unwrap_or(DEFAULT_CONTROLLER_MAX_TOKENS),
            synthesizer_max_tokens: self
                .synthesizer_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIZER_MAX_TOKENS),
            score_justification: self.score_justification.unwrap_or(true),
            attribution: self.attribution.unwrap_or_default(),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert!((config.threshold - DEFAULT_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.history_window, DEFAULT_HISTORY_WINDOW);
        assert_eq!(config.context_token_limit, DEFAULT_CONTEXT_TOKEN_LIMIT);
        assert!(config.score_justification);
        assert_eq!(config.attribution, SourceAttribution::Description);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .controller_model("gpt-3.5-turbo")
            .threshold(7.5)
            .top_k(2)
            .history_window(6)
            .attribution(SourceAttribution::RawText)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.controller_model, "gpt-3.5-turbo");
        assert!((config.threshold - 7.5).abs() < f64::EPSILON);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.history_window, 6);
        assert_eq!(config.attribution, SourceAttribution::RawText);
    }
}
