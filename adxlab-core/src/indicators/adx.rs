//! ADX: Average Directional Index with its +DI / -DI components.
//!
//! Steps:
//! 1. +DM and -DM from highs/lows `drift` bars apart
//! 2. ATR: Wilder-smoothed true range over `length`
//! 3. +DI = scalar * ma(+DM, length) / ATR, -DI likewise
//! 4. DX = scalar * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = ma(DX, signal_length)
//! 6. All three series shifted by `offset`
//!
//! `ma` is the configured [`MaMode`]; ATR is always Wilder-smoothed.
//!
//! When both DIs are zero (a range with no directional movement) DX is 0
//! rather than the undefined 0/0, so ADX decays toward 0 on directionless bars.

use super::atr::average_true_range;
use super::ma::{moving_average, MaMode};
use crate::config::IndicatorConfig;
use crate::domain::Bar;

/// The three series of one ADX computation, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    /// ADX: trend strength.
    pub index: Vec<f64>,
    /// +DI: strength of upward movement.
    pub positive: Vec<f64>,
    /// -DI: strength of downward movement.
    pub negative: Vec<f64>,
}

impl DirectionalIndex {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True when every series has the expected number of rows.
    pub fn is_aligned_with(&self, rows: usize) -> bool {
        self.index.len() == rows && self.positive.len() == rows && self.negative.len() == rows
    }
}

#[derive(Debug, Clone)]
pub struct Adx {
    length: usize,
    signal_length: usize,
    mode: MaMode,
    scalar: f64,
    drift: usize,
    offset: isize,
}

impl Adx {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            length: config.length,
            signal_length: config.signal_length,
            mode: config.mode,
            scalar: config.scalar,
            drift: config.drift,
            offset: config.offset,
        }
    }

    pub fn index_name(&self) -> String {
        format!("ADX_{}", self.signal_length)
    }

    pub fn positive_name(&self) -> String {
        format!("DMP_{}", self.length)
    }

    pub fn negative_name(&self) -> String {
        format!("DMN_{}", self.length)
    }

    /// Index of the first valid ADX value on gap-free input.
    pub fn lookback(&self) -> usize {
        let shifted = self.drift + self.mode.warmup(self.length) + self.mode.warmup(self.signal_length);
        shifted.saturating_add_signed(self.offset)
    }

    pub fn compute(&self, bars: &[Bar]) -> DirectionalIndex {
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.compute_hlc(&high, &low, &close)
    }

    /// Compute from raw high/low/close columns of equal length.
    pub fn compute_hlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> DirectionalIndex {
        let n = high.len().min(low.len()).min(close.len());

        // Step 1: directional movement
        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];
        if self.drift > 0 {
            for i in self.drift..n {
                let up = high[i] - high[i - self.drift];
                let dn = low[i - self.drift] - low[i];
                if up.is_nan() || dn.is_nan() {
                    continue;
                }
                plus_dm[i] = if up > dn && up > 0.0 { up } else { 0.0 };
                minus_dm[i] = if dn > up && dn > 0.0 { dn } else { 0.0 };
            }
        }

        // Step 2-3: directional indicators
        let atr = average_true_range(&high[..n], &low[..n], &close[..n], self.length, self.drift);
        let smooth_plus = moving_average(&plus_dm, self.length, self.mode);
        let smooth_minus = moving_average(&minus_dm, self.length, self.mode);

        let mut positive = vec![f64::NAN; n];
        let mut negative = vec![f64::NAN; n];
        for i in 0..n {
            if atr[i].is_nan() || atr[i] == 0.0 {
                continue;
            }
            positive[i] = self.scalar * smooth_plus[i] / atr[i];
            negative[i] = self.scalar * smooth_minus[i] / atr[i];
        }

        // Step 4: DX
        let mut dx = vec![f64::NAN; n];
        for i in 0..n {
            let (p, m) = (positive[i], negative[i]);
            if p.is_nan() || m.is_nan() {
                continue;
            }
            let sum = p + m;
            dx[i] = if sum == 0.0 {
                0.0
            } else {
                self.scalar * (p - m).abs() / sum
            };
        }

        // Step 5-6: ADX and offset
        let index = moving_average(&dx, self.signal_length, self.mode);
        DirectionalIndex {
            index: shift(&index, self.offset),
            positive: shift(&positive, self.offset),
            negative: shift(&negative, self.offset),
        }
    }
}

/// Shift a series by `offset` bars (positive = later), filling with NaN.
fn shift(values: &[f64], offset: isize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    let k = offset.unsigned_abs();
    if k >= n {
        return out;
    }
    if offset >= 0 {
        out[k..].copy_from_slice(&values[..n - k]);
    } else {
        out[..n - k].copy_from_slice(&values[k..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn adx_with(length: usize, signal_length: usize, mode: MaMode) -> Adx {
        Adx::new(&IndicatorConfig {
            length,
            signal_length,
            mode,
            ..IndicatorConfig::default()
        })
    }

    fn trending_bars(n: usize, step: f64) -> Vec<Bar> {
        let data: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn directionless_range_gives_zero_dx() {
        let n = 40;
        let high = vec![101.0; n];
        let low = vec![99.0; n];
        let close = vec![100.0; n];
        let di = adx_with(14, 14, MaMode::Rma).compute_hlc(&high, &low, &close);
        let last = n - 1;
        assert_eq!(di.positive[last], 0.0);
        assert_eq!(di.negative[last], 0.0);
        assert_eq!(di.index[last], 0.0);
    }

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let out = adx_with(3, 3, MaMode::Rma).compute(&bars);

        for series in [&out.index, &out.positive, &out.negative] {
            for (i, &v) in series.iter().enumerate() {
                if !v.is_nan() {
                    assert!((0.0..=100.0).contains(&v), "out of bounds at bar {i}: {v}");
                }
            }
        }
    }

    #[test]
    fn uptrend_has_positive_dominance() {
        let out = adx_with(5, 5, MaMode::Rma).compute(&trending_bars(30, 5.0));
        let last = out.len() - 1;
        assert!(out.positive[last] > out.negative[last]);
        assert!(out.index[last] > 20.0, "ADX should be elevated, got {}", out.index[last]);
    }

    #[test]
    fn downtrend_has_negative_dominance() {
        let out = adx_with(5, 5, MaMode::Rma).compute(&trending_bars(30, -5.0));
        let last = out.len() - 1;
        assert!(out.negative[last] > out.positive[last]);
    }

    #[test]
    fn lookback_matches_leading_nans() {
        let bars = trending_bars(60, 2.0);
        let adx = adx_with(14, 14, MaMode::Rma);
        let out = adx.compute(&bars);
        let first = out.index.iter().position(|v| !v.is_nan()).unwrap();
        assert_eq!(first, adx.lookback());
        assert_eq!(adx.lookback(), 27);
    }

    #[test]
    fn column_names_follow_parameters() {
        let adx = adx_with(20, 6, MaMode::Ema);
        assert_eq!(adx.index_name(), "ADX_6");
        assert_eq!(adx.positive_name(), "DMP_20");
        assert_eq!(adx.negative_name(), "DMN_20");
    }

    #[test]
    fn too_few_bars_is_all_nan() {
        let out = adx_with(3, 3, MaMode::Rma).compute(&trending_bars(1, 1.0));
        assert!(out.index.iter().all(|v| v.is_nan()));
        assert!(out.is_aligned_with(1));
    }

    #[test]
    fn offset_shifts_every_series() {
        let bars = trending_bars(40, 1.5);
        let base = adx_with(5, 5, MaMode::Rma).compute(&bars);
        let shifted = Adx::new(&IndicatorConfig {
            length: 5,
            signal_length: 5,
            offset: 2,
            ..IndicatorConfig::default()
        })
        .compute(&bars);

        assert!(shifted.index[0].is_nan() && shifted.index[1].is_nan());
        for i in 2..bars.len() {
            let (a, b) = (shifted.index[i], base.index[i - 2]);
            assert!(a == b || (a.is_nan() && b.is_nan()));
            assert_eq!(shifted.positive[i].to_bits(), base.positive[i - 2].to_bits());
        }
    }

    #[test]
    fn scalar_rescales_directional_values() {
        let bars = trending_bars(40, 1.0);
        let pct = adx_with(7, 7, MaMode::Rma).compute(&bars);
        let unit = Adx::new(&IndicatorConfig {
            length: 7,
            signal_length: 7,
            scalar: 1.0,
            ..IndicatorConfig::default()
        })
        .compute(&bars);
        let last = bars.len() - 1;
        assert!((pct.positive[last] - 100.0 * unit.positive[last]).abs() < 1e-9);
    }

    #[test]
    fn every_mode_produces_values() {
        let bars = trending_bars(80, 1.0);
        for mode in MaMode::ALL {
            let out = adx_with(10, 6, mode).compute(&bars);
            assert!(
                out.index.iter().any(|v| !v.is_nan()),
                "mode {mode} produced no ADX values"
            );
        }
    }

    #[test]
    fn shift_negative_offset_pulls_values_back() {
        let shifted = shift(&[1.0, 2.0, 3.0], -1);
        assert_eq!(shifted[0], 2.0);
        assert_eq!(shifted[1], 3.0);
        assert!(shifted[2].is_nan());
    }
}
