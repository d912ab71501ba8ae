//! Rolling mean and sample standard deviation.
//!
//! Each window is summed directly rather than with an add/remove running
//! sum, so the value at bar t is the same whether it is computed inside the
//! bar loop or in a pre-pass over the full series.

/// Mean and sample (n - 1) standard deviation of a window.
///
/// `None` if the window has fewer than two points or contains NaN.
pub fn window_mean_std(window: &[f64]) -> Option<(f64, f64)> {
    let n = window.len();
    if n < 2 || window.iter().any(|v| v.is_nan()) {
        return None;
    }
    let nf = n as f64;
    let mean = window.iter().sum::<f64>() / nf;
    let var = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (nf - 1.0);
    Some((mean, var.sqrt()))
}

/// Rolling mean/std over the trailing `period` values ending at each index.
///
/// Lookback: period - 1 (first valid value at index period-1). Windows that
/// contain NaN produce NaN.
pub fn rolling_mean_std(values: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(period >= 2, "rolling period must be >= 2");
    let n = values.len();
    let mut means = vec![f64::NAN; n];
    let mut stds = vec![f64::NAN; n];

    for end in (period - 1)..n {
        if let Some((m, s)) = window_mean_std(&values[end + 1 - period..=end]) {
            means[end] = m;
            stds[end] = s;
        }
    }

    (means, stds)
}

/// Z-score of `value` against a window. NaN when the window is unusable or
/// has zero dispersion.
pub fn zscore(value: f64, window: &[f64]) -> f64 {
    match window_mean_std(window) {
        Some((mean, std)) if std > 0.0 => (value - mean) / std,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_std_basic() {
        // mean 5, sample var = 32/7
        let (m, s) = window_mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_approx(m, 5.0, DEFAULT_EPSILON);
        assert_approx(s, (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_warmup_is_nan() {
        let (m, s) = rolling_mean_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(m[0].is_nan() && m[1].is_nan());
        assert!(s[0].is_nan() && s[1].is_nan());
        assert_approx(m[2], 2.0, DEFAULT_EPSILON);
        assert_approx(m[3], 3.0, DEFAULT_EPSILON);
        assert_approx(s[3], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_propagation() {
        let (m, _) = rolling_mean_std(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(m[1].is_nan());
        assert!(m[2].is_nan());
        assert_approx(m[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_matches_windowed_calls() {
        let values: Vec<f64> = (0..50).map(|i| ((i * 7) % 11) as f64 * 0.3).collect();
        let (m, s) = rolling_mean_std(&values, 10);
        for end in 9..values.len() {
            let (wm, ws) = window_mean_std(&values[end - 9..=end]).unwrap();
            assert_eq!(m[end].to_bits(), wm.to_bits());
            assert_eq!(s[end].to_bits(), ws.to_bits());
        }
    }

    #[test]
    fn zscore_of_flat_window_is_nan() {
        assert!(zscore(1.0, &[1.0, 1.0, 1.0]).is_nan());
        assert_approx(zscore(3.0, &[1.0, 3.0]), 2.0_f64.sqrt() / 2.0, DEFAULT_EPSILON);
    }
}
