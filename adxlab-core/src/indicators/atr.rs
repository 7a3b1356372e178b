//! True range and Average True Range.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), where the
//! previous close is `drift` bars back. The first `drift` bars have no previous
//! close and are NaN. ATR applies Wilder smoothing over `period`.

use super::ma::{moving_average, MaMode};

/// Compute the True Range series with a `drift`-bar lookback for the previous close.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64], drift: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = vec![f64::NAN; n];

    if drift == 0 {
        return tr;
    }

    for i in drift..n {
        let h = high[i];
        let l = low[i];
        let pc = close[i - drift];
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Wilder-smoothed ATR over `period` bars.
pub fn average_true_range(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    drift: usize,
) -> Vec<f64> {
    moving_average(&true_range(high, low, close, drift), period, MaMode::Rma)
}
