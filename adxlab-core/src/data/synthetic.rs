//! Synthetic provider for offline runs and tests.
//!
//! Produces a random walk from 100.0, seeded from the instrument name so the
//! same request always yields the same bars. Weekends are skipped for
//! intraday and daily intervals.

use super::provider::{DataError, FetchRequest, Interval, SeriesProvider};
use crate::domain::{Bar, BarSeries};
use chrono::{Datelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on generated bars per request.
pub const MAX_SYNTHETIC_BARS: usize = 200_000;

#[derive(Debug, Clone, Copy)]
pub struct SyntheticProvider {
    start_price: f64,
    max_step: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            max_step: 0.03,
        }
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest per-bar relative move (0.03 = 3%).
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step.abs();
        self
    }

    fn generate(&self, request: &FetchRequest) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(request.instrument.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let step = request.interval.duration();
        let skip_weekends = step <= Interval::OneDay.duration();
        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = request.start;

        while current <= request.end && bars.len() < MAX_SYNTHETIC_BARS {
            let weekday = current.weekday();
            if skip_weekends && (weekday == Weekday::Sat || weekday == Weekday::Sun) {
                current += step;
                continue;
            }

            let ret: f64 = if self.max_step > 0.0 {
                rng.gen_range(-self.max_step..self.max_step)
            } else {
                0.0
            };
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(1_000.0..100_000.0);

            bars.push(Bar {
                timestamp: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += step;
        }
        bars
    }
}

impl SeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        request.validate()?;
        Ok(BarSeries::new(self.generate(request))?)
    }
}
