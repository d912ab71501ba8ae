//! Strategy components.
//!
//! A run combines one signal strategy with the shared estimator, simulator
//! and ledger in `engine`. Strategies are interchangeable behind
//! `SignalStrategy`.

pub mod signal;

pub use signal::{build_strategy, MarketView, SignalEvaluation, SignalStrategy};
