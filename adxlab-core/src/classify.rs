//! Scale normalization and trend classification.
//!
//! Directional values arrive either as percentages or as unit fractions
//! depending on the scalar in use; [`to_percent_scale`] brings a unit-fraction
//! series onto the percentage scale so thresholds compare like with like.
//!
//! Classification precedence per bar:
//! 1. `Trending`: ADX above `trend_threshold`
//! 2. `Forming`: ADX above `forming_trend_threshold` and strictly rising
//! 3. `Consolidation` otherwise (including a missing ADX)
//!
//! Direction is only assigned outside consolidation. An exact +DI/-DI tie or
//! a missing DI value gives `Lateral`.

use crate::domain::{TrendDirection, TrendStatus};

/// Largest non-NaN value, or `None` for an all-missing series.
pub fn max_valid(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Percentage-scaled companion of a unit-fraction series.
///
/// Returns `Some(values * 100)` when the series has at least one valid value
/// and its maximum is at most 1.0; `None` when the series is already on the
/// percentage scale or holds no data.
pub fn to_percent_scale(values: &[f64]) -> Option<Vec<f64>> {
    match max_valid(values) {
        Some(max) if max <= 1.0 => Some(values.iter().map(|v| v * 100.0).collect()),
        _ => None,
    }
}

/// Thresholds that drive the status decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub forming: f64,
    pub trending: f64,
}

/// Classify one bar.
///
/// `prev_adx` is the previous bar's ADX (NaN on the first bar).
pub fn classify_bar(
    adx: f64,
    prev_adx: f64,
    positive: f64,
    negative: f64,
    thresholds: Thresholds,
) -> (TrendStatus, TrendDirection) {
    let is_trending = adx > thresholds.trending;
    let is_forming = adx > thresholds.forming && adx > prev_adx;

    let status = if is_trending {
        TrendStatus::Trending
    } else if is_forming {
        TrendStatus::Forming
    } else {
        TrendStatus::Consolidation
    };

    let direction = match status {
        TrendStatus::Consolidation => TrendDirection::Lateral,
        _ if positive > negative => TrendDirection::Upward,
        _ if negative > positive => TrendDirection::Downward,
        _ => TrendDirection::Lateral,
    };

    (status, direction)
}

/// Classify every bar of aligned ADX / +DI / -DI series.
pub fn classify_series(
    index: &[f64],
    positive: &[f64],
    negative: &[f64],
    thresholds: Thresholds,
) -> (Vec<TrendStatus>, Vec<TrendDirection>) {
    let n = index.len().min(positive.len()).min(negative.len());
    (0..n)
        .map(|i| {
            let prev = if i == 0 { f64::NAN } else { index[i - 1] };
            classify_bar(index[i], prev, positive[i], negative[i], thresholds)
        })
        .unzip()
}
