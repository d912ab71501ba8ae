//! Rotated-basis band strategy.
//!
//! Both legs are projected onto a unit signal vector to form a synthetic
//! price. A band of ±margin is centred on that price at the last accepted
//! trade (or the first active bar). Breaching the lower edge buys one order
//! along the trading vector; breaching the upper edge sells one. The band
//! re-centres only when a trade is accepted.

use tracing::debug;

use super::{MarketView, SignalEvaluation, SignalStrategy};
use crate::config::EngineConfig;
use crate::domain::{Direction, LegPosition, OrderIntent, PairBar};
use crate::engine::ExecutionOutcome;

/// Map a normalised angle in [-1, 1] to radians in [45°, 135°].
pub fn map_angle(normalised: f64) -> f64 {
    (90.0 + 45.0 * normalised).to_radians()
}

/// Unit vector (cos θ, sin θ).
pub fn unit_vector(theta: f64) -> (f64, f64) {
    let (s, c) = theta.sin_cos();
    let norm = c.hypot(s);
    (c / norm, s / norm)
}

/// Smallest non-zero absolute price change in a series, 0 if the series
/// never moves.
pub fn estimate_tick(prices: &[f64]) -> f64 {
    let tick = prices
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > 0.0 && d.is_finite())
        .fold(f64::INFINITY, f64::min);
    if tick.is_finite() {
        tick
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct RotatedBandStrategy {
    signal_vec: (f64, f64),
    trading_vec: (f64, f64),
    margin: f64,
    lookback: usize,
    unit: LegPosition,
    nc2l: u32,
    band: Option<(f64, f64)>,
    /// Net orders held along the trading vector.
    net_orders: i64,
    pending: Option<(Direction, f64)>,
}

impl RotatedBandStrategy {
    /// Tick sizes are instrument properties; they are estimated once from the
    /// whole series.
    pub fn new(
        signal_angle: f64,
        trading_angle: f64,
        margin_factor: f64,
        nc2l: u32,
        config: &EngineConfig,
        bars: &[PairBar],
    ) -> Self {
        let signal_vec = unit_vector(map_angle(signal_angle));
        let trading_vec = unit_vector(map_angle(trading_angle));

        let tick_a = estimate_tick(&crate::domain::leg_a(bars));
        let tick_b = estimate_tick(&crate::domain::leg_b(bars));
        let margin =
            (signal_vec.0.abs() * tick_a).max(signal_vec.1.abs() * tick_b) * margin_factor;

        let unit = LegPosition::new(
            config.order_size * trading_vec.0,
            config.order_size * trading_vec.1,
        );

        Self {
            signal_vec,
            trading_vec,
            margin,
            lookback: config.lookback,
            unit,
            nc2l,
            band: None,
            net_orders: 0,
            pending: None,
        }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn signal_vector(&self) -> (f64, f64) {
        self.signal_vec
    }

    pub fn trading_vector(&self) -> (f64, f64) {
        self.trading_vec
    }

    /// Synthetic price of a bar in the rotated basis.
    pub fn project(&self, bar: &PairBar) -> f64 {
        bar.price_a * self.signal_vec.0 + bar.price_b * self.signal_vec.1
    }

    fn centre(&mut self, signal: f64) {
        self.band = Some((signal - self.margin, signal + self.margin));
    }
}

impl SignalStrategy for RotatedBandStrategy {
    fn name(&self) -> &str {
        "rotated_band"
    }

    fn warmup_bars(&self) -> usize {
        self.lookback
    }

    fn evaluate(&mut self, view: &MarketView<'_>, _bar_index: usize) -> SignalEvaluation {
        let signal = self.project(view.current());
        let held = self.direction();

        let (lower, upper) = match self.band {
            Some(band) => band,
            None => {
                self.centre(signal);
                return SignalEvaluation::hold(signal, held);
            }
        };

        let side = if signal < lower {
            Direction::LongSpread
        } else if signal > upper {
            Direction::ShortSpread
        } else {
            return SignalEvaluation::hold(signal, held);
        };

        self.pending = Some((side, signal));
        SignalEvaluation {
            value: signal,
            direction: side,
            intent: Some(OrderIntent::accumulate(side, self.unit, self.nc2l)),
        }
    }

    fn on_execution(&mut self, outcome: &ExecutionOutcome, bar_index: usize) {
        let Some((side, signal)) = self.pending.take() else {
            return;
        };
        if let ExecutionOutcome::Filled { position, .. } = outcome {
            self.net_orders += side.sign() as i64;
            self.centre(signal);
            debug!(
                bar_index,
                side = ?side,
                signal,
                qty_a = position.qty_a,
                qty_b = position.qty_b,
                "band trade"
            );
        }
    }

    fn direction(&self) -> Direction {
        Direction::from_sign(self.net_orders as f64)
    }

    fn band(&self) -> Option<(f64, f64)> {
        self.band
    }
}
