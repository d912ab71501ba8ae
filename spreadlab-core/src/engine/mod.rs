//! Simulation engine — hedge ratio estimation, execution, accounting and the
//! bar loop that ties them to a signal strategy.
//!
//! Execution and the ledger update every bar; the hedge ratio and the
//! z-score/ECM strategies act on the rebalance cadence.

pub mod accounting;
pub mod hedge_ratio;
pub mod loop_runner;
pub mod simulator;
pub mod state;

pub use accounting::PnlLedger;
pub use hedge_ratio::{estimate_series, HedgeRatioState, HedgeRatioTracker};
pub use loop_runner::{run_backtest, Backtest};
pub use simulator::{ExecutionOutcome, ExecutionSimulator};
pub use state::{count_direction_changes, BarRecord, RunResult, RunSummary};
