//! Spread z-score strategy.
//!
//! z = (spread - mean) / std over the trailing `window` spreads (current bar
//! included, sample std). Acts only on rebalance bars:
//! - z > entry  -> ShortSpread
//! - z < -entry -> LongSpread
//! - |z| < exit -> Flat
//!
//! Entry checks win over the exit check, so a held side can flip directly.

use tracing::debug;

use super::{spread_target, MarketView, SignalEvaluation, SignalStrategy};
use crate::config::EngineConfig;
use crate::domain::Direction;
use crate::engine::ExecutionOutcome;
use crate::indicators::zscore;

#[derive(Debug, Clone)]
pub struct ZScoreStrategy {
    entry_threshold: f64,
    exit_threshold: f64,
    window: usize,
    lookback: usize,
    rebalance_period: usize,
    order_size: f64,
    inventory_multiple: u32,
    held: Direction,
}

impl ZScoreStrategy {
    pub fn new(
        entry_threshold: f64,
        exit_threshold: f64,
        window: usize,
        config: &EngineConfig,
    ) -> Self {
        Self {
            entry_threshold,
            exit_threshold,
            window,
            lookback: config.lookback,
            rebalance_period: config.rebalance_period,
            order_size: config.order_size,
            inventory_multiple: config.inventory_multiple(),
            held: Direction::Flat,
        }
    }

    /// Direction wanted for a z-score given the held side.
    pub fn desired(&self, z: f64) -> Direction {
        if z > self.entry_threshold {
            Direction::ShortSpread
        } else if z < -self.entry_threshold {
            Direction::LongSpread
        } else if z.abs() < self.exit_threshold {
            Direction::Flat
        } else {
            self.held
        }
    }
}

impl SignalStrategy for ZScoreStrategy {
    fn name(&self) -> &str {
        "z_score"
    }

    fn warmup_bars(&self) -> usize {
        self.lookback + self.window - 1
    }

    fn evaluate(&mut self, view: &MarketView<'_>, bar_index: usize) -> SignalEvaluation {
        let z = match view.trailing_spreads(self.window) {
            Some(window) => zscore(view.spread(), window),
            None => f64::NAN,
        };

        if bar_index % self.rebalance_period != 0 || !z.is_finite() {
            return SignalEvaluation::hold(z, self.held);
        }

        let desired = self.desired(z);
        if desired == self.held {
            return SignalEvaluation::hold(z, self.held);
        }

        SignalEvaluation {
            value: z,
            direction: desired,
            intent: Some(spread_target(
                desired,
                view.current(),
                view.ratio(),
                self.order_size,
                self.inventory_multiple,
            )),
        }
    }

    fn on_execution(&mut self, outcome: &ExecutionOutcome, bar_index: usize) {
        if let ExecutionOutcome::Filled { direction, .. } = outcome {
            debug!(bar_index, from = ?self.held, to = ?direction, "z-score transition");
            self.held = *direction;
        }
    }

    fn direction(&self) -> Direction {
        self.held
    }
}
