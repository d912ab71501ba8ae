//! Error-correction (ECM) strategy.
//!
//! α is the slope of Δspread on lagged spread over the trailing
//! `regression_window` spreads, refit on every rebalance bar. The signal is
//! α·s(t-1); it is only usable while α < 0. Entries are debounced: the signal
//! must stay past `entry_threshold` on `entry_hold_required` consecutive
//! rebalance bars. Exits fire when |signal| < `exit_threshold` unless the
//! spread trend still runs in the position's favour.

use tracing::debug;

use super::{spread_target, MarketView, SignalEvaluation, SignalStrategy};
use crate::config::EngineConfig;
use crate::domain::Direction;
use crate::engine::ExecutionOutcome;
use crate::indicators::reversion_speed;

/// Debounce state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcmPhase {
    Flat,
    /// Consecutive rebalance bars with signal above the entry threshold.
    CountingLong(u32),
    /// Consecutive rebalance bars with signal below minus the entry threshold.
    CountingShort(u32),
    Long,
    Short,
}

impl EcmPhase {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Long => Direction::LongSpread,
            Self::Short => Direction::ShortSpread,
            _ => Direction::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcmAction {
    None,
    Enter(Direction),
    Exit,
    /// Exit condition met but held open by the trend.
    ExitSuppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcmTransition {
    pub next: EcmPhase,
    pub action: EcmAction,
}

impl EcmTransition {
    fn stay(next: EcmPhase) -> Self {
        Self {
            next,
            action: EcmAction::None,
        }
    }
}

/// One rebalance-bar step of the state machine.
///
/// A NaN signal matches no branch and clears any pending count; a NaN trend
/// never suppresses an exit.
pub fn ecm_step(
    phase: EcmPhase,
    signal: f64,
    trend: f64,
    entry_threshold: f64,
    exit_threshold: f64,
    hold_required: u32,
) -> EcmTransition {
    use EcmPhase::*;

    let counted = |n: u32, side: Direction| {
        if n >= hold_required {
            let next = if side == Direction::LongSpread { Long } else { Short };
            EcmTransition {
                next,
                action: EcmAction::Enter(side),
            }
        } else if side == Direction::LongSpread {
            EcmTransition::stay(CountingLong(n))
        } else {
            EcmTransition::stay(CountingShort(n))
        }
    };

    if signal > entry_threshold {
        match phase {
            Flat | CountingShort(_) => counted(1, Direction::LongSpread),
            CountingLong(n) => counted(n + 1, Direction::LongSpread),
            Long | Short => EcmTransition::stay(phase),
        }
    } else if signal < -entry_threshold {
        match phase {
            Flat | CountingLong(_) => counted(1, Direction::ShortSpread),
            CountingShort(n) => counted(n + 1, Direction::ShortSpread),
            Long | Short => EcmTransition::stay(phase),
        }
    } else if signal.abs() < exit_threshold {
        match phase {
            Long if trend > 0.0 => EcmTransition {
                next: Long,
                action: EcmAction::ExitSuppressed,
            },
            Short if trend < 0.0 => EcmTransition {
                next: Short,
                action: EcmAction::ExitSuppressed,
            },
            Long | Short => EcmTransition {
                next: Flat,
                action: EcmAction::Exit,
            },
            _ => EcmTransition::stay(Flat),
        }
    } else {
        match phase {
            CountingLong(_) | CountingShort(_) => EcmTransition::stay(Flat),
            _ => EcmTransition::stay(phase),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EcmStrategy {
    entry_threshold: f64,
    exit_threshold: f64,
    entry_hold_required: u32,
    trend_window: usize,
    regression_window: usize,
    lookback: usize,
    rebalance_period: usize,
    order_size: f64,
    inventory_multiple: u32,
    alpha: f64,
    phase: EcmPhase,
    pending: Option<EcmPhase>,
}

impl EcmStrategy {
    pub fn new(
        entry_threshold: f64,
        exit_threshold: f64,
        entry_hold_required: u32,
        trend_window: usize,
        regression_window: usize,
        config: &EngineConfig,
    ) -> Self {
        Self {
            entry_threshold,
            exit_threshold,
            entry_hold_required,
            trend_window,
            regression_window,
            lookback: config.lookback,
            rebalance_period: config.rebalance_period,
            order_size: config.order_size,
            inventory_multiple: config.inventory_multiple(),
            alpha: f64::NAN,
            phase: EcmPhase::Flat,
            pending: None,
        }
    }

    /// Last fitted reversion speed (NaN if unusable).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn phase(&self) -> EcmPhase {
        self.phase
    }

    fn refit(&mut self, view: &MarketView<'_>) {
        self.alpha = view
            .trailing_spreads(self.regression_window)
            .and_then(reversion_speed)
            .filter(|a| *a < 0.0 && a.is_finite())
            .unwrap_or(f64::NAN);
    }

    /// Change in the trailing `trend_window` mean of the spread.
    fn trend(&self, view: &MarketView<'_>) -> f64 {
        let w = self.trend_window;
        match view.trailing_spreads(w + 1) {
            Some(s) => {
                let wf = w as f64;
                let now = s[1..].iter().sum::<f64>() / wf;
                let before = s[..w].iter().sum::<f64>() / wf;
                now - before
            }
            None => f64::NAN,
        }
    }

    fn signal(&self, view: &MarketView<'_>) -> f64 {
        match view.trailing_spreads(2) {
            Some(s) => self.alpha * s[0],
            None => f64::NAN,
        }
    }
}

impl SignalStrategy for EcmStrategy {
    fn name(&self) -> &str {
        "ecm"
    }

    fn warmup_bars(&self) -> usize {
        self.lookback + self.regression_window
    }

    fn evaluate(&mut self, view: &MarketView<'_>, bar_index: usize) -> SignalEvaluation {
        let boundary = bar_index % self.rebalance_period == 0;
        if boundary {
            self.refit(view);
        }
        let signal = self.signal(view);
        let held = self.phase.direction();
        if !boundary {
            return SignalEvaluation::hold(signal, held);
        }

        let trend = self.trend(view);
        let step = ecm_step(
            self.phase,
            signal,
            trend,
            self.entry_threshold,
            self.exit_threshold,
            self.entry_hold_required,
        );

        let target = match step.action {
            EcmAction::Enter(side) => side,
            EcmAction::Exit => Direction::Flat,
            EcmAction::ExitSuppressed => {
                debug!(bar_index, trend, held = ?held, "exit held open by trend");
                self.phase = step.next;
                return SignalEvaluation::hold(signal, held);
            }
            EcmAction::None => {
                if let EcmPhase::CountingLong(n) | EcmPhase::CountingShort(n) = step.next {
                    debug!(bar_index, count = n, required = self.entry_hold_required, "entry debounce");
                }
                self.phase = step.next;
                return SignalEvaluation::hold(signal, held);
            }
        };

        self.pending = Some(step.next);
        SignalEvaluation {
            value: signal,
            direction: target,
            intent: Some(spread_target(
                target,
                view.current(),
                view.ratio(),
                self.order_size,
                self.inventory_multiple,
            )),
        }
    }

    fn on_execution(&mut self, outcome: &ExecutionOutcome, bar_index: usize) {
        let Some(next) = self.pending.take() else {
            return;
        };
        match outcome {
            ExecutionOutcome::Filled { .. } | ExecutionOutcome::NoChange => {
                debug!(bar_index, from = ?self.phase, to = ?next, "ecm transition");
                self.phase = next;
            }
            ExecutionOutcome::Rejected { .. } => {
                if matches!(
                    self.phase,
                    EcmPhase::CountingLong(_) | EcmPhase::CountingShort(_)
                ) {
                    self.phase = EcmPhase::Flat;
                }
            }
        }
    }

    fn direction(&self) -> Direction {
        self.phase.direction()
    }
}
