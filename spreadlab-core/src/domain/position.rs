use serde::{Deserialize, Serialize};

use super::PairBar;

/// Signed per-leg quantities held by the simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegPosition {
    pub qty_a: f64,
    pub qty_b: f64,
}

impl LegPosition {
    pub const FLAT: Self = Self {
        qty_a: 0.0,
        qty_b: 0.0,
    };

    pub fn new(qty_a: f64, qty_b: f64) -> Self {
        Self { qty_a, qty_b }
    }

    pub fn is_flat(&self) -> bool {
        self.qty_a == 0.0 && self.qty_b == 0.0
    }

    /// Multiply both legs by a scalar.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            qty_a: self.qty_a * factor,
            qty_b: self.qty_b * factor,
        }
    }

    /// Leg-wise sum.
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            qty_a: self.qty_a + other.qty_a,
            qty_b: self.qty_b + other.qty_b,
        }
    }

    /// Leg-wise absolute value.
    pub fn abs(&self) -> Self {
        Self {
            qty_a: self.qty_a.abs(),
            qty_b: self.qty_b.abs(),
        }
    }

    /// Quantities worth `notional` on each leg at the bar's prices.
    pub fn notional_cap(bar: &PairBar, notional: f64) -> Self {
        Self {
            qty_a: notional / bar.price_a.abs(),
            qty_b: notional / bar.price_b.abs(),
        }
    }

    /// True if every leg magnitude is within the matching limit.
    pub fn within(&self, limit: &Self) -> bool {
        self.qty_a.abs() <= limit.qty_a && self.qty_b.abs() <= limit.qty_b
    }

    /// Per-leg market value at the bar's prices.
    pub fn inventory(&self, bar: &PairBar) -> (f64, f64) {
        (self.qty_a * bar.price_a, self.qty_b * bar.price_b)
    }

    /// Cash change from holding this position across `prev` → `curr`.
    ///
    /// Uses price deltas only, so a constant offset on either leg's price
    /// series leaves the result unchanged.
    pub fn mark_to_market(&self, prev: &PairBar, curr: &PairBar) -> f64 {
        self.qty_a * (curr.price_a - prev.price_a) + self.qty_b * (curr.price_b - prev.price_b)
    }
}
