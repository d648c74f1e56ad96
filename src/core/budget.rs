//! Execution budget for a single turn.
//!
//! The budget is a deadline shared by every execution unit in a plan.
//! Being `Copy`, it can be handed to each concurrent task; `remaining()`
//! shrinks monotonically for every holder, so components observe one
//! decrementing resource without any shared mutable state.

use std::time::{Duration, Instant};

/// Remaining-time budget for outcome-producing calls.
///
/// Components must check [`Budget::is_expired`] before each
/// outcome-producing call and stop issuing further calls once exhausted,
/// propagating partial results instead of blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    deadline: Instant,
}

impl Budget {
    /// Creates a budget expiring after the given duration.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    /// Time left before the deadline, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

impl Default for Budget {
    /// A generous default of ten minutes, matching a full research turn.
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
