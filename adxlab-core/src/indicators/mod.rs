//! Indicator math over raw `f64` series.
//!
//! Indicators are pure functions: price columns in, aligned numeric series
//! out, NaN for warmup and missing positions. The engine converts NaN to
//! nulls when the series land in a table.

pub mod adx;
pub mod atr;
pub mod ma;

pub use adx::{Adx, DirectionalIndex};
pub use atr::{average_true_range, true_range};
pub use ma::{moving_average, MaMode, HULL_MIN_PERIOD};

/// Create bars from (open, high, low, close) tuples for testing, one day apart.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
