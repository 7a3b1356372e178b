//! Criterion benchmarks for ADXLab hot paths.
//!
//! Benchmarks:
//! 1. Moving averages over one long series, per mode
//! 2. ADX computation over raw bars
//! 3. Full engine pass (frame in, annotated frame out)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use adxlab_core::domain::{Bar, BarSeries};
use adxlab_core::indicators::{moving_average, Adx, MaMode};
use adxlab_core::{annotate, IndicatorConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 1.10 + (i as f64 * 0.05).sin() * 0.02 + i as f64 * 1e-5;
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open: close - 0.0003,
                high: close + 0.0015,
                low: close - 0.0015,
                close,
                volume: 1_000.0 + (i % 500) as f64,
            }
        })
        .collect()
}

// ── 1. Moving averages ───────────────────────────────────────────────

fn bench_moving_averages(c: &mut Criterion) {
    let values: Vec<f64> = make_bars(10_000).iter().map(|b| b.close).collect();
    let mut group = c.benchmark_group("moving_average");
    for mode in MaMode::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            b.iter(|| moving_average(black_box(&values), 14, mode))
        });
    }
    group.finish();
}

// ── 2. ADX ───────────────────────────────────────────────────────────

fn bench_adx(c: &mut Criterion) {
    let mut group = c.benchmark_group("adx_compute");
    for n in [1_000usize, 10_000, 100_000] {
        let bars = make_bars(n);
        let adx = Adx::new(&IndicatorConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| adx.compute(black_box(bars)))
        });
    }
    group.finish();
}

// ── 3. Engine ────────────────────────────────────────────────────────

fn bench_annotate(c: &mut Criterion) {
    let df = match BarSeries::new(make_bars(10_000)).and_then(|s| s.to_frame()) {
        Ok(df) => df,
        Err(e) => panic!("bench input: {e}"),
    };
    let config = IndicatorConfig::default();
    c.bench_function("annotate_10k", |b| {
        b.iter(|| annotate(black_box(&df), &config, Some("_bench")))
    });
}

criterion_group!(benches, bench_moving_averages, bench_adx, bench_annotate);
criterion_main!(benches);
