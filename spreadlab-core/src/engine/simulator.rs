//! Position & execution simulator.
//!
//! Fills are instantaneous and all-or-nothing: a candidate position that
//! breaches a per-leg cap is rejected and the held position is untouched.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{Direction, LegPosition, OrderIntent};

/// Result of submitting one intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    /// Candidate equals the held position; nothing to do.
    NoChange,
    Filled {
        direction: Direction,
        previous: LegPosition,
        position: LegPosition,
    },
    /// Candidate would breach the inventory cap (or is not finite).
    Rejected {
        direction: Direction,
        candidate: LegPosition,
    },
}

impl ExecutionOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Holds the book and applies intents to it.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSimulator {
    position: LegPosition,
    fills: usize,
    rejections: usize,
}

impl ExecutionSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> LegPosition {
        self.position
    }

    pub fn fills(&self) -> usize {
        self.fills
    }

    pub fn rejections(&self) -> usize {
        self.rejections
    }

    /// Apply `intent` to the held position.
    pub fn execute(&mut self, intent: &OrderIntent, bar_index: usize) -> ExecutionOutcome {
        let candidate = intent.candidate(&self.position);

        if candidate == self.position {
            return ExecutionOutcome::NoChange;
        }

        let finite = candidate.qty_a.is_finite() && candidate.qty_b.is_finite();
        if !finite || !candidate.within(&intent.limit) {
            self.rejections += 1;
            trace!(
                bar_index,
                direction = ?intent.direction,
                qty_a = candidate.qty_a,
                qty_b = candidate.qty_b,
                "trade rejected by inventory limit"
            );
            return ExecutionOutcome::Rejected {
                direction: intent.direction,
                candidate,
            };
        }

        let previous = self.position;
        self.position = candidate;
        self.fills += 1;
        ExecutionOutcome::Filled {
            direction: intent.direction,
            previous,
            position: candidate,
        }
    }
}
