//! System prompts and template builders for the pipeline.
//!
//! Prompts are the core instructions that define the controller's and
//! synthesizer's behavior. Template builders format user messages with
//! conversational history, candidate sources, and collected outcomes.

use std::fmt::Write;
use std::path::Path;

use super::source::SourceRegistry;
use crate::core::{ChatHistory, ChatMessage, ChatMessageKind};

/// System prompt for the planning controller.
pub const CONTROLLER_SYSTEM_PROMPT: &str =
    "You are an assistant responsible to identify the intent of the user.";

/// System prompt for the response synthesizer.
pub const SYNTHESIZER_SYSTEM_PROMPT: &str = "You are a research analyst whose job is to write a \
     research report answering the user query based on data from different sources.";

/// Rendered in place of the history when no prior turn exists.
pub const NO_HISTORY_LITERAL: &str = "No conversational history";

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/quorum-rs/prompts";

/// Filename for the controller prompt template.
const CONTROLLER_FILENAME: &str = "controller.md";
/// Filename for the synthesizer prompt template.
const SYNTHESIZER_FILENAME: &str = "synthesizer.md";

/// A set of system prompts for the pipeline.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from configuration, environment, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for the planning controller.
    pub controller: String,
    /// System prompt for the response synthesizer.
    pub synthesizer: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument (from `AgentConfig::prompt_dir`)
    /// 2. `QUORUM_PROMPT_DIR` environment variable
    /// 3. `~/.config/quorum-rs/prompts/`
    ///
    /// Each file is loaded independently — a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("QUORUM_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            controller: load_file(CONTROLLER_FILENAME, CONTROLLER_SYSTEM_PROMPT),
            synthesizer: load_file(SYNTHESIZER_FILENAME, SYNTHESIZER_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            controller: CONTROLLER_SYSTEM_PROMPT.to_string(),
            synthesizer: SYNTHESIZER_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Formats the chat history for the query reformulation prompt.
///
/// Takes all messages except the most recent one (the current query),
/// keeps at most the last `window` of them, and renders user and agent
/// turns as `User:` / `Assistant:` lines; other kinds are skipped. When
/// no prior message remains, renders [`NO_HISTORY_LITERAL`].
#[must_use]
pub fn render_chat_history(history: &ChatHistory, window: usize) -> String {
    let messages = history.messages();
    let prior = messages.len().saturating_sub(1);
    if prior < 1 {
        return NO_HISTORY_LITERAL.to_string();
    }

    let start = prior.saturating_sub(window);
    let mut rendered = String::new();
    for msg in &messages[start..prior] {
        match msg.kind() {
            ChatMessageKind::User => {
                let _ = writeln!(rendered, "User: {}", msg.text());
            }
            ChatMessageKind::Agent => {
                let _ = writeln!(rendered, "Assistant: {}", msg.text());
            }
            ChatMessageKind::Chain => {}
        }
    }

    if rendered.is_empty() {
        NO_HISTORY_LITERAL.to_string()
    } else {
        rendered
    }
}

/// Renders the candidate sources as `name: …, description: …` lines.
#[must_use]
pub fn render_source_choices(sources: &SourceRegistry) -> String {
    let mut choices = String::new();
    for source in sources.sources() {
        let _ = writeln!(
            choices,
            "name: {}, description: {}",
            source.name(),
            source.description()
        );
    }
    choices
}

/// Builds the two-subtask planning prompt.
///
/// Subtask 1 reformulates the query against the conversational history;
/// subtask 2 scores every candidate source out of 10. When
/// `score_justification` is set, the format instruction asks for a third
/// `;`-separated justification field on each score line.
#[must_use]
pub fn build_plan_prompt(
    history: &str,
    user_query: &str,
    answer_choices: &str,
    score_justification: bool,
) -> String {
    let line_format = if score_justification {
        "{name};{score};{justification}"
    } else {
        "{name};{score}"
    };

    format!(
        "Use the latest user query and the conversational history to identify the intent of the user.\n\
         Break this task down into 2 subtasks. First perform subtask 1 and then subtask 2.\n\
         \n\
         Context for subtask 1:\n\
         Conversational history:\n\
         {history}\n\
         \n\
         User query: {user_query}\n\
         \n\
         Instructions for subtask 1:\n\
         # Use the historical conversation to update the user query to better answer the user question\n\
         # If the query does not need to be updated, do not update the query\n\
         # If there is no conversational history, do not update the query\n\
         # If the conversational history is not relevant to the query, do not update the query\n\
         # See the below examples for how to update the user query\n\
         ************\n\
         Example 1:\n\
         Conversational History:\n\
         User: Who is the CEO of OpenAI?\n\
         Assistant: Sam Altman\n\
         \n\
         User Query: How old is he?\n\
         \n\
         Updated Query: How old is Sam Altman?\n\
         ************\n\
         Example 2:\n\
         Conversational History:\n\
         User: Who is the CEO of OpenAI?\n\
         Assistant: Sam Altman\n\
         \n\
         User Query: What is the price of Bitcoin?\n\
         \n\
         Updated Query: What is the price of Bitcoin?\n\
         ************\n\
         \n\
         Context for subtask 2:\n\
         Categories are given as a name and a description (name: {{name}}, description: {{description}}):\n\
         {answer_choices}\n\
         \n\
         Instructions for subtask 2:\n\
         # Use the updated query to identify the intent of the user\n\
         # Score categories out of 10 using their description\n\
         # For each category, you will answer with {line_format}\n\
         # The updated query should be identical for each category\n\
         # Each response is provided on a new line\n\
         # When no category is relevant, you will answer exactly with 'unknown'\n\
         \n\
         Your response should always be formatted like this:\n\
         Subtask 1: {{updated_query}}\n\
         ---\n\
         Subtask 2:\n\
         {{subtask2_results}}\n"
    )
}

/// Builds the synthesis prompt from the assembled context and query.
#[must_use]
pub fn build_synthesis_prompt(context: &str, query: &str) -> String {
    format!(
        "# Instructions\n\
         - The provided context is a list of research data answering the user query from different sources.\n\
         - Combine the following data from multiple sources into a single research report to answer the query.\n\
         - Make sure to highlight any agreements or disagreements between different responses in the final response.\n\
         - Explicitly state from which source different parts of the final response are from.\n\
         \n\
         # Context:\n\
         {context}\n\
         \n\
         # Query:\n\
         {query}\n\
         \n\
         Answer:\n"
    )
}
