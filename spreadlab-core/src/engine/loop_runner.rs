//! Bar-by-bar simulation loop.
//!
//! Per bar, in order:
//! 1. Mark-to-market: PnL from the position held through the previous bar
//! 2. Hedge ratio: refit on cadence, otherwise hold
//! 3. Signal: strategy evaluation on active bars
//! 4. Execution: submit the intent, report the outcome back to the strategy
//! 5. Record: position, inventory, signal, band, cumulative PnL

use tracing::{info, warn};

use crate::components::signal::{build_strategy, MarketView};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::{leg_a, leg_b, PairBar};
use crate::indicators::hedge_angle_degrees;

use super::accounting::PnlLedger;
use super::hedge_ratio::HedgeRatioTracker;
use super::simulator::ExecutionSimulator;
use super::state::{count_direction_changes, BarRecord, RunResult, RunSummary};

/// A validated engine, ready to run over any number of series.
///
/// Runs share nothing: each call to `run` builds fresh estimator, strategy,
/// simulator and ledger state.
#[derive(Debug, Clone)]
pub struct Backtest {
    config: EngineConfig,
}

impl Backtest {
    /// Validate `config`. Fails before any bar is seen.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulate over an aligned, time-ordered pair series.
    pub fn run(&self, bars: &[PairBar]) -> RunResult {
        let config = &self.config;
        let n = bars.len();
        let a = leg_a(bars);
        let b = leg_b(bars);

        let mut tracker = HedgeRatioTracker::new(config.lookback, config.rebalance_period);
        let mut strategy = build_strategy(config, bars);
        let mut simulator = ExecutionSimulator::new();
        let mut ledger = PnlLedger::new();

        let insufficient_data = n <= config.lookback;
        info!(
            strategy = strategy.name(),
            bars = n,
            lookback = config.lookback,
            rebalance_period = config.rebalance_period,
            warmup_bars = strategy.warmup_bars(),
            "starting run"
        );
        if insufficient_data {
            warn!(
                bars = n,
                lookback = config.lookback,
                "insufficient data, every bar stays inactive"
            );
        }

        let mut ratios = Vec::with_capacity(n);
        let mut spreads = Vec::with_capacity(n);
        let mut records = Vec::with_capacity(n);

        for (i, bar) in bars.iter().enumerate() {
            let pnl = if i == 0 {
                ledger.open()
            } else {
                ledger.mark(&simulator.position(), &bars[i - 1], bar)
            };

            let ratio = tracker.update(&a, &b, i);
            let spread = bar.spread(ratio);
            ratios.push(ratio);
            spreads.push(spread);

            let active = ratio.is_finite();
            let mut signal = f64::NAN;
            if active {
                let view = MarketView::new(&bars[..=i], &ratios, &spreads);
                let evaluation = strategy.evaluate(&view, i);
                signal = evaluation.value;
                if let Some(intent) = evaluation.intent {
                    let outcome = simulator.execute(&intent, i);
                    strategy.on_execution(&outcome, i);
                }
            }

            let position = simulator.position();
            let (inventory_a, inventory_b) = position.inventory(bar);
            let (band_lower, band_upper) = strategy.band().unwrap_or((f64::NAN, f64::NAN));

            records.push(BarRecord {
                timestamp: bar.timestamp,
                price_a: bar.price_a,
                price_b: bar.price_b,
                hedge_ratio: ratio,
                ratio_as_of: tracker.state().map(|s| s.as_of_index),
                hedge_angle: hedge_angle_degrees(ratio),
                spread,
                signal,
                direction: strategy.direction(),
                position_a: position.qty_a,
                position_b: position.qty_b,
                inventory_a,
                inventory_b,
                pnl,
                band_lower,
                band_upper,
                active,
            });
        }

        let summary = RunSummary {
            final_pnl: ledger.cumulative(),
            direction_changes: count_direction_changes(&records),
            trade_count: simulator.fills(),
            rejected_trades: simulator.rejections(),
            degenerate_windows: tracker.degenerate_windows(),
            active_bars: records.iter().filter(|r| r.active).count(),
        };

        info!(
            strategy = strategy.name(),
            final_pnl = summary.final_pnl,
            trades = summary.trade_count,
            rejected = summary.rejected_trades,
            active_bars = summary.active_bars,
            "run complete"
        );

        RunResult {
            strategy: strategy.name().to_string(),
            records,
            summary,
            insufficient_data,
        }
    }
}

/// Validate `config` and run it over `bars`.
pub fn run_backtest(config: &EngineConfig, bars: &[PairBar]) -> Result<RunResult, ConfigError> {
    Ok(Backtest::new(config.clone())?.run(bars))
}
