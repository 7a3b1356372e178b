//! Moving-average smoothing over raw `f64` series.
//!
//! Every mode shares one contract: output has the input's length, warmup
//! positions are `f64::NAN`, and leading NaNs in the input are skipped so that
//! composed averages (DEMA, TEMA, Hull) can smooth an already-smoothed series.
//! A NaN after the warmup taints the remainder of the series.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest window the Hull average is defined for.
pub const HULL_MIN_PERIOD: usize = 4;

/// Moving-average family used to smooth directional movement and the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaMode {
    /// Wilder's relative moving average (alpha = 1/period).
    #[default]
    Rma,
    Ema,
    Sma,
    Wma,
    /// Hull moving average.
    Hma,
    Dema,
    Tema,
}

impl MaMode {
    pub const ALL: [MaMode; 7] = [
        MaMode::Rma,
        MaMode::Ema,
        MaMode::Sma,
        MaMode::Wma,
        MaMode::Hma,
        MaMode::Dema,
        MaMode::Tema,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaMode::Rma => "rma",
            MaMode::Ema => "ema",
            MaMode::Sma => "sma",
            MaMode::Wma => "wma",
            MaMode::Hma => "hma",
            MaMode::Dema => "dema",
            MaMode::Tema => "tema",
        }
    }

    /// Index of the first valid output for a gap-free input of sufficient length.
    pub fn warmup(&self, period: usize) -> usize {
        let p = period.saturating_sub(1);
        match self {
            MaMode::Rma | MaMode::Ema | MaMode::Sma | MaMode::Wma => p,
            MaMode::Dema => 2 * p,
            MaMode::Tema => 3 * p,
            MaMode::Hma => p + hull_sqrt_period(period).saturating_sub(1),
        }
    }
}

impl fmt::Display for MaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rma" => Ok(MaMode::Rma),
            "ema" => Ok(MaMode::Ema),
            "sma" => Ok(MaMode::Sma),
            "wma" => Ok(MaMode::Wma),
            "hma" | "hull" => Ok(MaMode::Hma),
            "dema" => Ok(MaMode::Dema),
            "tema" => Ok(MaMode::Tema),
            other => Err(format!(
                "unknown moving-average mode '{other}' (expected rma, ema, sma, wma, hma, dema, tema)"
            )),
        }
    }
}

/// Smooth `values` with the given mode and window.
///
/// Leading NaNs are skipped; a window of zero, a window longer than the valid
/// data, or a Hull window below [`HULL_MIN_PERIOD`] produce an all-NaN result.
pub fn moving_average(values: &[f64], period: usize, mode: MaMode) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return result,
    };
    if period == 0 {
        return result;
    }

    let tail = &values[start..];
    let smoothed = match mode {
        MaMode::Rma => wilder_smooth(tail, period),
        MaMode::Ema => ema_of_series(tail, period),
        MaMode::Sma => sma_of_series(tail, period),
        MaMode::Wma => wma_of_series(tail, period),
        MaMode::Hma => hma_of_series(tail, period),
        MaMode::Dema => {
            let e1 = moving_average(tail, period, MaMode::Ema);
            let e2 = moving_average(&e1, period, MaMode::Ema);
            e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
        }
        MaMode::Tema => {
            let e1 = moving_average(tail, period, MaMode::Ema);
            let e2 = moving_average(&e1, period, MaMode::Ema);
            let e3 = moving_average(&e2, period, MaMode::Ema);
            (0..tail.len())
                .map(|i| 3.0 * e1[i] - 3.0 * e2[i] + e3[i])
                .collect()
        }
    };

    result[start..].copy_from_slice(&smoothed);
    result
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
/// Seed: mean of the first `period` consecutive valid values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    // First index that opens a run of `period` non-NaN values.
    let seed_start = (0..=n - period).find(|&i| values[i..i + period].iter().all(|v| !v.is_nan()));

    let seed_start = match seed_start {
        Some(s) => s,
        None => return result,
    };

    let seed_end = seed_start + period;
    let seed: f64 = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;

    for i in seed_end..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

/// Exponential moving average, alpha = 2/(period+1), seeded with the SMA of
/// the first `period` values.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Rolling arithmetic mean. A window containing NaN yields NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    weighted_window(values, period, |_| 1.0)
}

/// Linearly weighted moving average: the newest value weighs `period`,
/// the oldest weighs 1.
pub fn wma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    weighted_window(values, period, |k| (k + 1) as f64)
}

/// Hull moving average: `WMA(2 * WMA(n/2) - WMA(n), floor(sqrt(n)))`.
pub fn hma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    if period < HULL_MIN_PERIOD {
        return vec![f64::NAN; n];
    }

    let half = moving_average(values, period / 2, MaMode::Wma);
    let full = moving_average(values, period, MaMode::Wma);
    let raw: Vec<f64> = half.iter().zip(&full).map(|(h, f)| 2.0 * h - f).collect();
    moving_average(&raw, hull_sqrt_period(period), MaMode::Wma)
}

fn hull_sqrt_period(period: usize) -> usize {
    (period as f64).sqrt().floor() as usize
}

/// Windowed weighted mean; `weight(k)` gives the weight of the k-th oldest
/// value in the window (k = 0 is the oldest).
fn weighted_window(values: &[f64], period: usize, weight: impl Fn(usize) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let weights: Vec<f64> = (0..period).map(&weight).collect();
    let total: f64 = weights.iter().sum();

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let acc: f64 = window.iter().zip(&weights).map(|(v, w)| v * w).sum();
        result[i] = acc / total;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    const NAN: f64 = f64::NAN;

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed SMA(10,11,12) = 11
        let result = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let result = ema_of_series(&[10.0, 11.0, 12.0, NAN, 14.0], 3);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn wilder_known_values() {
        // Seed mean(8, 9, 6) = 23/3, then (1/3)*6 + (2/3)*(23/3) = 64/9
        let result = wilder_smooth(&[8.0, 9.0, 6.0, 6.0], 3);
        assert!(result[1].is_nan());
        assert_approx(result[2], 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 64.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_rolling_mean() {
        let result = sma_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        for v in result.iter().take(4) {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wma_weights_newest_heaviest() {
        // (1*1 + 2*2 + 3*3) / 6 = 14/6
        let result = wma_of_series(&[1.0, 2.0, 3.0], 3);
        assert_approx(result[2], 14.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_nans_are_skipped() {
        let values = [NAN, NAN, 10.0, 11.0, 12.0, 13.0];
        let result = moving_average(&values, 3, MaMode::Ema);
        assert!(result[3].is_nan());
        assert_approx(result[4], 11.0, DEFAULT_EPSILON);
        assert_approx(result[5], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn hull_below_minimum_is_all_nan() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let result = moving_average(&values, 3, MaMode::Hma);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn linear_input_is_tracked_exactly_by_lag_free_modes() {
        // DEMA, TEMA and HMA remove the lag of a straight line once warmed up.
        let values: Vec<f64> = (0..60).map(|i| 2.0 * i as f64 + 5.0).collect();
        for mode in [MaMode::Dema, MaMode::Tema, MaMode::Hma] {
            let result = moving_average(&values, 9, mode);
            let last = result[59];
            assert_approx(last, values[59], 1e-6);
        }
    }

    #[test]
    fn warmup_matches_first_valid_index() {
        let values: Vec<f64> = (0..80).map(|i| (i as f64 * 0.3).sin() + 10.0).collect();
        for mode in MaMode::ALL {
            let result = moving_average(&values, 9, mode);
            let first = result.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, mode.warmup(9), "mode {mode}");
        }
    }

    #[test]
    fn zero_period_is_all_nan() {
        let result = moving_average(&[1.0, 2.0, 3.0], 0, MaMode::Sma);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn parse_modes() {
        assert_eq!("HMA".parse::<MaMode>().unwrap(), MaMode::Hma);
        assert_eq!("hull".parse::<MaMode>().unwrap(), MaMode::Hma);
        assert!("kama".parse::<MaMode>().is_err());
        for mode in MaMode::ALL {
            assert_eq!(mode.as_str().parse::<MaMode>().unwrap(), mode);
        }
    }
}
