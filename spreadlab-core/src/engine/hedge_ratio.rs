//! Rolling hedge ratio with a rebalance cadence.
//!
//! The ratio is the OLS slope of leg A on leg B (with intercept) over the
//! `lookback` bars strictly before a refresh bar. Refreshes happen at
//! `i % rebalance_period == 0 && i >= lookback`; in between the last value is
//! held as a step function.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::indicators::fit_ols;

/// Last successful refit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeRatioState {
    pub as_of_index: usize,
    pub ratio: f64,
    pub lookback: usize,
}

/// Cached hedge ratio, refreshed on cadence.
#[derive(Debug, Clone)]
pub struct HedgeRatioTracker {
    lookback: usize,
    rebalance_period: usize,
    state: Option<HedgeRatioState>,
    degenerate_windows: usize,
}

impl HedgeRatioTracker {
    pub fn new(lookback: usize, rebalance_period: usize) -> Self {
        assert!(lookback >= 2, "lookback must be >= 2");
        assert!(rebalance_period >= 1, "rebalance_period must be >= 1");
        Self {
            lookback,
            rebalance_period,
            state: None,
            degenerate_windows: 0,
        }
    }

    pub fn is_refresh_bar(&self, bar_index: usize) -> bool {
        is_refresh_bar(bar_index, self.lookback, self.rebalance_period)
    }

    /// Advance to `bar_index` and return the ratio in force for that bar.
    ///
    /// `leg_a` and `leg_b` must cover at least `bar_index` bars; only the
    /// window before `bar_index` is read.
    pub fn update(&mut self, leg_a: &[f64], leg_b: &[f64], bar_index: usize) -> f64 {
        if self.is_refresh_bar(bar_index) {
            let start = bar_index - self.lookback;
            match fit_ols(&leg_b[start..bar_index], &leg_a[start..bar_index]) {
                Some(fit) => {
                    self.state = Some(HedgeRatioState {
                        as_of_index: bar_index,
                        ratio: fit.slope,
                        lookback: self.lookback,
                    });
                }
                None => {
                    self.degenerate_windows += 1;
                    warn!(
                        bar_index,
                        previous = self.ratio(),
                        "degenerate regression window, holding previous hedge ratio"
                    );
                }
            }
        }
        self.ratio()
    }

    /// Ratio in force, NaN before the first successful refit.
    pub fn ratio(&self) -> f64 {
        self.state.map_or(f64::NAN, |s| s.ratio)
    }

    pub fn state(&self) -> Option<&HedgeRatioState> {
        self.state.as_ref()
    }

    pub fn degenerate_windows(&self) -> usize {
        self.degenerate_windows
    }
}

fn is_refresh_bar(bar_index: usize, lookback: usize, rebalance_period: usize) -> bool {
    bar_index >= lookback && bar_index % rebalance_period == 0
}

/// Full hedge ratio series in one pass over the refresh bars.
///
/// Each refresh window is fitted independently and the results are forward
/// filled, so the output is bit-identical to stepping a `HedgeRatioTracker`
/// bar by bar.
pub fn estimate_series(
    leg_a: &[f64],
    leg_b: &[f64],
    lookback: usize,
    rebalance_period: usize,
) -> Vec<f64> {
    assert_eq!(leg_a.len(), leg_b.len(), "legs must have equal length");
    let n = leg_a.len();

    let fits: Vec<(usize, Option<f64>)> = (lookback..n)
        .filter(|&i| is_refresh_bar(i, lookback, rebalance_period))
        .map(|i| {
            let start = i - lookback;
            let slope = fit_ols(&leg_b[start..i], &leg_a[start..i]).map(|f| f.slope);
            (i, slope)
        })
        .collect();

    let mut out = vec![f64::NAN; n];
    let mut current = f64::NAN;
    let mut next_fit = fits.iter().peekable();
    for (i, slot) in out.iter_mut().enumerate() {
        if let Some(&&(at, slope)) = next_fit.peek() {
            if at == i {
                if let Some(s) = slope {
                    current = s;
                }
                next_fit.next();
            }
        }
        *slot = current;
    }
    out
}
