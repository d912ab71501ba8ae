use crate::domain::{LegPosition, PairBar};

/// Cumulative mark-to-market PnL.
///
/// Each bar is marked with the position held through the previous bar and
/// the price change into the current bar. Bar 0 starts at zero.
#[derive(Debug, Clone, Default)]
pub struct PnlLedger {
    cumulative: f64,
}

impl PnlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening bar: no price delta yet.
    pub fn open(&mut self) -> f64 {
        self.cumulative
    }

    /// Mark `held` across `prev` → `curr`; returns the new cumulative value.
    pub fn mark(&mut self, held: &LegPosition, prev: &PairBar, curr: &PairBar) -> f64 {
        self.cumulative += held.mark_to_market(prev, curr);
        self.cumulative
    }

    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }
}
