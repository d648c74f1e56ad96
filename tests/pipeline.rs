//! End-to-end pipeline tests through the public API.
//!
//! A scripted provider plays the model: the first completion is the
//! planning response, the second is the synthesis. Source runners are
//! in-memory mocks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quorum_rs::agent::{
    AgentConfig, Orchestrator, Source, SourceKind, SourceRegistry, SourceRunner,
};
use quorum_rs::core::{Budget, ChatHistory, ChatMessage};
use quorum_rs::error::Error;
use quorum_rs::llm::{CompletionRequest, CompletionResponse, LlmProvider, TokenUsage};

struct ScriptedProvider {
    completions: Mutex<Vec<String>>,
    prompts_seen: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(completions: &[&str]) -> Self {
        let mut scripted: Vec<String> = completions.iter().map(|c| (*c).to_string()).collect();
        scripted.reverse();
        Self {
            completions: Mutex::new(scripted),
            prompts_seen: Mutex::new(Vec::new()),
        }
    }

    fn prompt(&self, call: usize) -> String {
        self.prompts_seen
            .lock()
            .ok()
            .and_then(|p| p.get(call).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn post_chat(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error> {
        if let (Ok(mut prompts), Some(user)) = (self.prompts_seen.lock(), request.messages.last())
        {
            prompts.push(user.content.clone());
        }
        let completion = self
            .completions
            .lock()
            .map_or_else(|_| String::new(), |mut s| s.pop().unwrap_or_default());
        Ok(CompletionResponse {
            choices: vec![completion],
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            },
        })
    }
}

struct AnswerRunner {
    answer: &'static str,
    name: &'static str,
}

#[async_trait]
impl SourceRunner for AnswerRunner {
    async fn run(&self, _state: &ChatMessage, _budget: Budget) -> Result<ChatMessage, Error> {
        Ok(ChatMessage::chain_from_source(self.answer, self.name))
    }
}

struct FailingRunner;

#[async_trait]
impl SourceRunner for FailingRunner {
    async fn run(&self, _state: &ChatMessage, _budget: Budget) -> Result<ChatMessage, Error> {
        Err(Error::SourceExecution {
            name: "search".to_string(),
            message: "engine unavailable".to_string(),
        })
    }
}

struct SlowRunner;

#[async_trait]
impl SourceRunner for SlowRunner {
    async fn run(&self, _state: &ChatMessage, _budget: Budget) -> Result<ChatMessage, Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(ChatMessage::chain_from_source("too late", "slow"))
    }
}

fn registry() -> SourceRegistry {
    let mut sources = SourceRegistry::new();
    sources
        .register(Source::new(
            "docs",
            "the company's annual report",
            SourceKind::DocRetrieval,
            Arc::new(AnswerRunner {
                answer: "revenue grew 7% year over year",
                name: "docs",
            }),
        ))
        .unwrap_or_else(|_| unreachable!());
    sources
        .register(Source::new(
            "search",
            "a web search engine for recent news",
            SourceKind::WebSearch,
            Arc::new(FailingRunner),
        ))
        .unwrap_or_else(|_| unreachable!());
    sources
        .register(Source::new(
            "pandas",
            "a query engine over quarterly financial tables",
            SourceKind::TabularQuery,
            Arc::new(AnswerRunner {
                answer: "Q4 revenue was 62.0B",
                name: "pandas",
            }),
        ))
        .unwrap_or_else(|_| unreachable!());
    sources
}

fn orchestrator(provider: Arc<ScriptedProvider>) -> Orchestrator {
    let config = AgentConfig::builder().api_key("test").build().unwrap_or_else(|_| unreachable!());
    Orchestrator::new(provider, config, registry())
}

#[tokio::test]
async fn scores_above_threshold_select_the_plan() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Subtask 1: What was the revenue growth?\n---\nSubtask 2:\ndocs;8;directly relevant\nsearch;3;not financial",
        "According to the annual report, revenue grew 7%.",
    ]));
    let result = orchestrator(Arc::clone(&provider))
        .ask("What was the revenue growth?", Budget::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    // only docs cleared the strict threshold of 5
    assert_eq!(result.selected_sources, vec!["docs"]);
    assert_eq!(result.sources_succeeded, 1);
    assert_eq!(result.sources_failed, 0);
    assert_eq!(
        result.response.message.text(),
        "According to the annual report, revenue grew 7%."
    );

    // the docs outcome reached the synthesis context, with attribution
    let synthesis_prompt = provider.prompt(1);
    assert!(synthesis_prompt.contains("revenue grew 7% year over year"));
    assert!(synthesis_prompt.contains("the company's annual report"));
    assert!(!synthesis_prompt.contains("web search"));
}

#[tokio::test]
async fn history_feeds_reformulation() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Subtask 1: When was Satya Nadella appointed CEO?\n---\nSubtask 2:\ndocs;8",
        "He was appointed in February 2014.",
    ]));

    let mut history = ChatHistory::new();
    history.add_user_message("Who is the CEO of Microsoft?");
    history.add_agent_message("Satya Nadella");
    history.add_user_message("When was he appointed?");

    let result = orchestrator(Arc::clone(&provider))
        .execute(&history, Budget::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.reformulated_query, "When was Satya Nadella appointed CEO?");

    // the planning prompt carried the prior turns plus the current query
    let plan_prompt = provider.prompt(0);
    assert!(plan_prompt.contains("User: Who is the CEO of Microsoft?"));
    assert!(plan_prompt.contains("Assistant: Satya Nadella"));
    assert!(plan_prompt.contains("User query: When was he appointed?"));

    // synthesis answers the user's own turn; the reformulation only
    // drives source execution
    let synthesis_prompt = provider.prompt(1);
    assert!(synthesis_prompt.contains("# Query:\nWhen was he appointed?"));
    assert!(!synthesis_prompt.contains("# Query:\nWhen was Satya Nadella appointed CEO?"));
}

#[tokio::test]
async fn malformed_plan_soft_fails_to_no_sources() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "I'm sorry, I cannot follow that format.",
        "I could not find relevant information for this query.",
    ]));
    let result = orchestrator(Arc::clone(&provider))
        .ask("anything", Budget::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(result.selected_sources.is_empty());
    assert_eq!(result.sources_succeeded, 0);
    assert_eq!(result.sources_failed, 0);
    // synthesis still ran, on an empty context
    assert_eq!(
        result.response.message.text(),
        "I could not find relevant information for this query."
    );
}

#[tokio::test]
async fn failing_source_is_dropped_not_fatal() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Subtask 1: q\n---\nSubtask 2:\ndocs;8\nsearch;9\npandas;7",
        "Combined answer from docs and pandas.",
    ]));
    let result = orchestrator(Arc::clone(&provider))
        .ask("q", Budget::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    // rank order: search first, but its outcome failed and was dropped
    assert_eq!(result.selected_sources, vec!["search", "docs", "pandas"]);
    assert_eq!(result.sources_succeeded, 2);
    assert_eq!(result.sources_failed, 1);

    let synthesis_prompt = provider.prompt(1);
    assert!(synthesis_prompt.contains("revenue grew 7% year over year"));
    assert!(synthesis_prompt.contains("Q4 revenue was 62.0B"));
    assert!(!synthesis_prompt.contains("engine unavailable"));
}

#[tokio::test]
async fn slow_source_is_capped_by_the_budget() {
    let mut sources = registry();
    sources
        .register(Source::new(
            "slow",
            "an archive that takes minutes to answer",
            SourceKind::DocRetrieval,
            Arc::new(SlowRunner),
        ))
        .unwrap_or_else(|_| unreachable!());

    let provider = Arc::new(ScriptedProvider::new(&[
        "Subtask 1: q\n---\nSubtask 2:\nslow;9\ndocs;8",
        "Answer from the fast source.",
    ]));
    let config = AgentConfig::builder().api_key("test").build().unwrap_or_else(|_| unreachable!());
    let orchestrator = Orchestrator::new(provider.clone(), config, sources);

    let result = orchestrator
        .ask("q", Budget::new(Duration::from_millis(100)))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.sources_succeeded, 1);
    assert_eq!(result.sources_failed, 1);
    assert!(provider.prompt(1).contains("revenue grew 7% year over year"));
}

#[tokio::test]
async fn no_relevant_source_answer_yields_empty_plan() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Subtask 1: the price of Bitcoin\n---\nSubtask 2:\nunknown",
        "None of my sources cover cryptocurrency prices.",
    ]));
    let result = orchestrator(provider)
        .ask("What is the price of Bitcoin?", Budget::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(result.selected_sources.is_empty());
    assert_eq!(
        result.response.message.text(),
        "None of my sources cover cryptocurrency prices."
    );
    // both completion calls were billed
    assert_eq!(result.total_tokens, 240);
}
