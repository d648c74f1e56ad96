//! Concurrent execution of a plan's sources.
//!
//! Fans the plan's execution units out across tasks, capped by a
//! semaphore. Each source writes to its own outcome slot, so no locking
//! is needed; the merge is a pure read after the join barrier. A failing
//! source becomes an error-flagged outcome and never aborts the turn.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use super::controller::Plan;
use super::source::SourceRegistry;
use crate::core::ChatMessage;

/// Runs the selected sources against their shared initial state.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLayer {
    max_concurrency: usize,
}

impl ExecutionLayer {
    /// Creates an execution layer capped at the given concurrency.
    #[must_use]
    pub const fn new(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }

    /// Executes every unit of the plan, producing one outcome history
    /// per source.
    ///
    /// The budget is checked before each run; once exhausted, remaining
    /// units produce error-flagged outcomes instead of blocking, so
    /// partial results always propagate. Returns after all branches have
    /// completed (join barrier).
    pub async fn execute(
        &self,
        sources: &SourceRegistry,
        plan: &Plan,
    ) -> HashMap<String, Vec<ChatMessage>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(plan.units.len());

        for unit in &plan.units {
            let Some(source) = sources.get(&unit.source_name) else {
                handles.push(None);
                continue;
            };
            let runner = source.runner();
            let sem = Arc::clone(&semaphore);
            let budget = unit.budget;

            // the task owns the only copies and hands them back with
            // its outcome
            let name = unit.source_name.clone();
            let initial_state = unit.initial_state.clone();
            let handle = tokio::spawn(async move {
                let outcome = match sem.acquire().await {
                    Err(_) => ChatMessage::chain_error("semaphore closed", &name),
                    // permit held for the whole run
                    Ok(_permit) if budget.is_expired() => {
                        debug!(source = %name, "budget exhausted before execution");
                        ChatMessage::chain_error("budget exhausted before execution", &name)
                    }
                    Ok(_permit) => {
                        match tokio::time::timeout(
                            budget.remaining(),
                            runner.run(&initial_state, budget),
                        )
                        .await
                        {
                            Ok(Ok(outcome)) => outcome,
                            Ok(Err(e)) => {
                                debug!(source = %name, error = %e, "source run failed");
                                ChatMessage::chain_error(e.to_string(), &name)
                            }
                            Err(_) => {
                                debug!(source = %name, "budget exhausted during execution");
                                ChatMessage::chain_error(
                                    "budget exhausted during execution",
                                    &name,
                                )
                            }
                        }
                    }
                };
                (name, initial_state, outcome)
            });

            handles.push(Some(handle));
        }

        // Join barrier: every branch completes before outcomes merge.
        // The rare fallback paths re-clone from the plan.
        let mut outcomes = HashMap::with_capacity(handles.len());
        for (unit, handle) in plan.units.iter().zip(handles) {
            let (name, initial_state, outcome) = match handle {
                Some(handle) => match handle.await {
                    Ok(entry) => entry,
                    Err(e) => (
                        unit.source_name.clone(),
                        unit.initial_state.clone(),
                        ChatMessage::chain_error(
                            format!("task join failed: {e}"),
                            &unit.source_name,
                        ),
                    ),
                },
                None => (
                    unit.source_name.clone(),
                    unit.initial_state.clone(),
                    ChatMessage::chain_error("source not registered", &unit.source_name),
                ),
            };
            outcomes.insert(name, vec![initial_state, outcome]);
        }

        outcomes
    }
}
