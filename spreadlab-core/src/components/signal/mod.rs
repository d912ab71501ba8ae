//! Signal strategies — turn spread history into a scalar signal and order
//! intents.
//!
//! Strategies see only market data (bars, hedge ratios, spreads up to the
//! current bar). They learn whether an intent was filled through
//! `on_execution`; they never touch the book directly.

pub mod ecm;
pub mod rotated_band;
pub mod zscore;

use crate::config::{EngineConfig, StrategyConfig};
use crate::domain::{Direction, LegPosition, OrderIntent, PairBar};
use crate::engine::ExecutionOutcome;

pub use ecm::{ecm_step, EcmAction, EcmPhase, EcmStrategy, EcmTransition};
pub use rotated_band::{estimate_tick, map_angle, unit_vector, RotatedBandStrategy};
pub use zscore::ZScoreStrategy;

/// Read-only window of market data ending at the current bar.
#[derive(Debug, Clone, Copy)]
pub struct MarketView<'a> {
    pub bars: &'a [PairBar],
    /// Hedge ratio in force at each bar (NaN before the first fit).
    pub hedge_ratios: &'a [f64],
    /// `price_a - ratio * price_b` at each bar.
    pub spreads: &'a [f64],
}

impl<'a> MarketView<'a> {
    pub fn new(bars: &'a [PairBar], hedge_ratios: &'a [f64], spreads: &'a [f64]) -> Self {
        debug_assert_eq!(bars.len(), hedge_ratios.len());
        debug_assert_eq!(bars.len(), spreads.len());
        Self {
            bars,
            hedge_ratios,
            spreads,
        }
    }

    pub fn current(&self) -> &PairBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn ratio(&self) -> f64 {
        self.hedge_ratios[self.hedge_ratios.len() - 1]
    }

    pub fn spread(&self) -> f64 {
        self.spreads[self.spreads.len() - 1]
    }

    /// Last `n` spreads including the current bar, if that many exist.
    pub fn trailing_spreads(&self, n: usize) -> Option<&'a [f64]> {
        let len = self.spreads.len();
        (n <= len).then(|| &self.spreads[len - n..])
    }
}

/// What a strategy produced at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalEvaluation {
    /// Strategy-specific scalar (z-score, ECM signal, projected price).
    pub value: f64,
    /// Direction the strategy is asking for.
    pub direction: Direction,
    /// Order to submit, if any.
    pub intent: Option<OrderIntent>,
}

impl SignalEvaluation {
    pub fn hold(value: f64, direction: Direction) -> Self {
        Self {
            value,
            direction,
            intent: None,
        }
    }
}

/// One interchangeable signal strategy.
pub trait SignalStrategy: Send {
    /// Short identifier, e.g. "z_score".
    fn name(&self) -> &str;

    /// Bars before the first evaluation that can produce a finite signal.
    fn warmup_bars(&self) -> usize;

    /// Evaluate at `bar_index`. `view` ends at `bar_index` inclusive.
    fn evaluate(&mut self, view: &MarketView<'_>, bar_index: usize) -> SignalEvaluation;

    /// Feedback on the intent returned by the last `evaluate` call.
    fn on_execution(&mut self, outcome: &ExecutionOutcome, bar_index: usize);

    /// Direction currently held.
    fn direction(&self) -> Direction;

    /// Active trading band, for strategies that keep one.
    fn band(&self) -> Option<(f64, f64)> {
        None
    }
}

/// Construct the strategy named by `config.strategy`.
///
/// `config` must already be validated. `bars` is the full input series; only
/// the rotated band reads it up front, to estimate tick sizes.
pub fn build_strategy(config: &EngineConfig, bars: &[PairBar]) -> Box<dyn SignalStrategy> {
    match &config.strategy {
        StrategyConfig::ZScore {
            entry_threshold,
            exit_threshold,
            window,
        } => Box::new(ZScoreStrategy::new(
            *entry_threshold,
            *exit_threshold,
            *window,
            config,
        )),
        StrategyConfig::Ecm {
            entry_threshold,
            exit_threshold,
            entry_hold_required,
            trend_window,
            regression_window,
        } => Box::new(EcmStrategy::new(
            *entry_threshold,
            *exit_threshold,
            *entry_hold_required,
            *trend_window,
            regression_window.unwrap_or(config.lookback),
            config,
        )),
        StrategyConfig::RotatedBand {
            signal_angle,
            trading_angle,
            margin_factor,
            nc2l,
        } => Box::new(RotatedBandStrategy::new(
            *signal_angle,
            *trading_angle,
            *margin_factor,
            *nc2l,
            config,
            bars,
        )),
    }
}

/// Target-sized intent for the z-score and ECM strategies.
///
/// One order is `order_size / price_a` units of leg A against `ratio` times
/// that in leg B. Each leg may hold at most `multiple × order_size` of
/// notional at the current prices, so a steep ratio can push leg B over.
pub(crate) fn spread_target(
    direction: Direction,
    bar: &PairBar,
    ratio: f64,
    order_size: f64,
    multiple: u32,
) -> OrderIntent {
    let qty_a = order_size / bar.price_a;
    let unit = LegPosition::new(qty_a, -ratio * qty_a);
    let limit = LegPosition::notional_cap(bar, order_size * multiple as f64);
    OrderIntent::target(direction, unit, limit)
}
