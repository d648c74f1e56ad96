//! Outcome collector.
//!
//! Scans the execution layer's outcome map and keeps only the outcomes
//! that completed without internal error, tagging each with its
//! originating source id for downstream attribution.

use std::collections::HashMap;

use tracing::debug;

use crate::core::{ChatMessage, ChatMessageKind, ScoredChatMessage};

/// Collects clean, attributed outcomes from raw execution results.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeCollector;

impl OutcomeCollector {
    /// Creates a collector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Filters the outcome map down to successful, attributed results.
    ///
    /// Only sources named in `selected` (this planning cycle's picks)
    /// are considered, in plan order — outcomes lingering from an
    /// earlier turn never resurface. For each source, only the last
    /// message of its history counts, and it must be a Chain-kind
    /// message (produced by a source runner) that is not error-flagged.
    /// Survivors are wrapped with a fixed score of 1.0.
    #[must_use]
    pub fn collect(
        &self,
        outcomes: &HashMap<String, Vec<ChatMessage>>,
        selected: &[String],
    ) -> Vec<ScoredChatMessage> {
        let mut collected = Vec::with_capacity(selected.len());

        for name in selected {
            let Some(last) = outcomes.get(name).and_then(|history| history.last()) else {
                debug!(source = %name, "no outcome recorded for selected source");
                continue;
            };

            if !last.is_of_kind(ChatMessageKind::Chain) || last.is_error() {
                debug!(source = %name, "outcome excluded from aggregation");
                continue;
            }

            collected.push(ScoredChatMessage::new(
                ChatMessage::agent_from_source(last.text(), name.clone(), last.is_error()),
                1.0,
            ));
        }

        collected
    }
}
