//! Order intent — what a signal strategy asks the execution simulator to do.

use serde::{Deserialize, Serialize};

use super::{Direction, LegPosition};

/// How the candidate position is derived from the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sizing {
    /// Candidate = direction × unit. Replaces the held position.
    Target,
    /// Candidate = held + direction × unit. Adds one order to the book.
    Accumulate,
}

/// A request to move the book in `direction`.
///
/// `unit` is one order expressed leg-wise for a LongSpread; `limit` is the
/// per-leg absolute cap the candidate must respect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub direction: Direction,
    pub unit: LegPosition,
    pub sizing: Sizing,
    pub limit: LegPosition,
}

impl OrderIntent {
    /// Target intent checked against a fixed per-leg `limit`.
    pub fn target(direction: Direction, unit: LegPosition, limit: LegPosition) -> Self {
        Self {
            direction,
            unit,
            sizing: Sizing::Target,
            limit,
        }
    }

    /// Accumulating intent with a cap of `multiple` orders on each leg.
    pub fn accumulate(direction: Direction, unit: LegPosition, multiple: u32) -> Self {
        Self {
            direction,
            unit,
            sizing: Sizing::Accumulate,
            limit: unit.abs().scaled(multiple as f64),
        }
    }

    /// Position the book would hold if the intent were filled.
    pub fn candidate(&self, held: &LegPosition) -> LegPosition {
        let step = self.unit.scaled(self.direction.sign());
        match self.sizing {
            Sizing::Target => step,
            Sizing::Accumulate => held.plus(&step),
        }
    }
}
