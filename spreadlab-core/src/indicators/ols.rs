//! Ordinary least squares with intercept, one regressor.
//!
//! Closed form: slope = Sxy / Sxx, intercept = ȳ - slope·x̄. A regressor
//! with (numerically) zero variance has no unique solution and yields
//! `None`; callers decide how to recover.

use serde::{Deserialize, Serialize};

/// Relative tolerance below which the regressor variance counts as zero.
const DEGENERATE_RELATIVE_TOL: f64 = 1e-14;

/// Result of fitting `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. NaN when `y` is constant.
    pub r_squared: f64,
    pub n: usize,
}

/// Fit `y ~ x` with intercept.
///
/// Returns `None` if the inputs differ in length, hold fewer than two
/// points, contain a non-finite value, or if `x` has zero variance.
pub fn fit_ols(x: &[f64], y: &[f64]) -> Option<OlsFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    let mut x_sq = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
        x_sq += xi * xi;
    }

    // A constant series can leave rounding residue in Sxx; compare against
    // the raw second moment rather than exact zero.
    if sxx <= x_sq.max(1.0) * DEGENERATE_RELATIVE_TOL {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let ss_res = syy - slope * sxy;
    let r_squared = if syy > 0.0 { 1.0 - ss_res / syy } else { f64::NAN };

    Some(OlsFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}

/// Angle of a hedge ratio line in degrees, `atan(ratio)`.
pub fn hedge_angle_degrees(ratio: f64) -> f64 {
    ratio.atan().to_degrees()
}
