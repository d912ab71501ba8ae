//! SpreadLab Core — pairs-trading simulation engine.
//!
//! This crate contains the computational core:
//! - Domain types (pair bars, leg positions, directions, order intents)
//! - Statistical primitives (OLS, rolling mean/std, half-life, robust volatility)
//! - Rolling hedge ratio estimator with a rebalance cadence
//! - Three interchangeable signal strategies (z-score, ECM, rotated band)
//! - Execution simulator with per-leg inventory caps
//! - Mark-to-market PnL ledger and per-bar result aggregation
//! - Seeded synthetic pair generator
//!
//! No I/O happens here. A run is a synchronous left-to-right scan over an
//! immutable series.

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod synthetic;

pub use config::{ConfigError, EngineConfig, StrategyConfig};
pub use domain::{Direction, LegPosition, PairBar};
pub use engine::{run_backtest, Backtest, BarRecord, RunResult, RunSummary};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a batch driver moves across threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PairBar>();
        require_sync::<domain::PairBar>();
        require_send::<domain::LegPosition>();
        require_sync::<domain::LegPosition>();
        require_send::<domain::OrderIntent>();
        require_sync::<domain::OrderIntent>();

        // Configuration
        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();
        require_send::<config::ConfigError>();
        require_sync::<config::ConfigError>();

        // Engine types
        require_send::<engine::Backtest>();
        require_sync::<engine::Backtest>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::HedgeRatioTracker>();
        require_sync::<engine::HedgeRatioTracker>();

        // Strategies
        require_send::<Box<dyn components::SignalStrategy>>();
        require_send::<components::signal::ZScoreStrategy>();
        require_send::<components::signal::EcmStrategy>();
        require_send::<components::signal::RotatedBandStrategy>();
    }

    /// Architecture contract: strategies never see the book.
    ///
    /// `evaluate()` takes a `MarketView` and a bar index only. Fill results
    /// arrive through `on_execution`.
    #[test]
    fn strategy_trait_has_no_position_parameter() {
        fn _check_trait_object_builds(
            strategy: &mut dyn components::SignalStrategy,
            view: &components::MarketView<'_>,
        ) -> components::SignalEvaluation {
            strategy.evaluate(view, 0)
        }
    }
}
