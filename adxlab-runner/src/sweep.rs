//! Parameter sweep over ADX configurations.
//!
//! Every combination of the grid runs the engine against the same base table
//! with a suffix that encodes its parameters. The new columns are joined onto
//! one wide table in grid order, whether the combinations ran sequentially or
//! in parallel.

use anyhow::{Context, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use adxlab_core::{annotate, IndicatorConfig, MaMode};

/// Parameter grid specification.
///
/// Axes are enumerated in declaration order, `modes` varying fastest. Fields
/// not on the grid (scalar, drift, offset) come from the base configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamGrid {
    pub forming_trend_thresholds: Vec<f64>,
    pub trend_thresholds: Vec<f64>,
    pub lengths: Vec<usize>,
    #[serde(alias = "lensigs")]
    pub signal_lengths: Vec<usize>,
    #[serde(alias = "mamodes")]
    pub modes: Vec<MaMode>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self::reference()
    }
}

impl ParamGrid {
    /// A handful of values per axis: 540 combinations before filtering.
    pub fn reference() -> Self {
        Self {
            forming_trend_thresholds: vec![20.0, 25.0],
            trend_thresholds: vec![40.0, 45.0, 50.0],
            lengths: vec![7, 10, 15, 20, 25, 30],
            signal_lengths: vec![3, 6, 10],
            modes: vec![MaMode::Rma, MaMode::Ema, MaMode::Hma, MaMode::Dema, MaMode::Tema],
        }
    }

    /// Returns the total number of combinations, valid or not.
    pub fn size(&self) -> usize {
        self.forming_trend_thresholds.len()
            * self.trend_thresholds.len()
            * self.lengths.len()
            * self.signal_lengths.len()
            * self.modes.len()
    }

    /// Names of the axes that hold no values.
    pub fn empty_axes(&self) -> Vec<&'static str> {
        let mut empty = Vec::new();
        if self.forming_trend_thresholds.is_empty() {
            empty.push("forming_trend_thresholds");
        }
        if self.trend_thresholds.is_empty() {
            empty.push("trend_thresholds");
        }
        if self.lengths.is_empty() {
            empty.push("lengths");
        }
        if self.signal_lengths.is_empty() {
            empty.push("signal_lengths");
        }
        if self.modes.is_empty() {
            empty.push("modes");
        }
        empty
    }

    /// Every combination in grid order, each tagged with its verdict.
    pub fn combinations(&self, base: &IndicatorConfig) -> Vec<Combination> {
        let mut out = Vec::with_capacity(self.size());
        for &forming in &self.forming_trend_thresholds {
            for &trend in &self.trend_thresholds {
                for &length in &self.lengths {
                    for &signal_length in &self.signal_lengths {
                        for &mode in &self.modes {
                            let config = IndicatorConfig {
                                length,
                                signal_length,
                                mode,
                                forming_trend_threshold: forming,
                                trend_threshold: trend,
                                ..base.clone()
                            };
                            out.push(Combination::new(config));
                        }
                    }
                }
            }
        }
        out
    }
}

/// One point of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub config: IndicatorConfig,
    pub suffix: String,
    /// Why the combination is skipped, if it is.
    pub skip_reason: Option<String>,
}

impl Combination {
    fn new(config: IndicatorConfig) -> Self {
        let skip_reason = config
            .window_rule_violation()
            .map(|rule| rule.to_string())
            .or_else(|| config.validate().err().map(|e| e.to_string()));
        Self {
            suffix: suffix(&config),
            config,
            skip_reason,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Column suffix encoding a configuration, e.g. `_ft20_tt40_len7_ls6_marma`.
pub fn suffix(config: &IndicatorConfig) -> String {
    format!(
        "_ft{}_tt{}_len{}_ls{}_ma{}",
        config.forming_trend_threshold,
        config.trend_threshold,
        config.length,
        config.signal_length,
        config.mode
    )
}

/// What happened to the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    /// Combinations in the grid.
    pub total: usize,
    /// Combinations whose columns were merged.
    pub processed: usize,
    /// Combinations rejected by the window or threshold rules.
    pub skipped_invalid: usize,
    /// Suffixes of combinations that produced no new columns.
    pub empty: Vec<String>,
    /// Columns added to the base table.
    pub columns_added: usize,
}

/// Merged table plus the report.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub frame: DataFrame,
    pub report: SweepReport,
}

/// Parameter sweep executor.
///
/// Runs the engine for all valid configurations in a grid, optionally in parallel.
#[derive(Debug, Clone, Default)]
pub struct ParamSweep {
    parallel: bool,
}

impl ParamSweep {
    /// Creates a sequential sweep.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Executes the sweep over `base_frame`.
    pub fn run(
        &self,
        base_frame: &DataFrame,
        grid: &ParamGrid,
        base: &IndicatorConfig,
    ) -> Result<SweepOutcome> {
        self.run_with_progress(base_frame, grid, base, |_, _, _| {})
    }

    /// Executes a sweep with progress reporting.
    ///
    /// The callback is invoked after each valid combination is computed with:
    /// - Current index among valid combinations (0-based)
    /// - Number of valid combinations
    /// - The combination's suffix
    pub fn run_with_progress<F>(
        &self,
        base_frame: &DataFrame,
        grid: &ParamGrid,
        base: &IndicatorConfig,
        progress_callback: F,
    ) -> Result<SweepOutcome>
    where
        F: Fn(usize, usize, &str) + Send + Sync,
    {
        let combinations = grid.combinations(base);
        let mut report = SweepReport {
            total: combinations.len(),
            ..SweepReport::default()
        };

        let mut valid = Vec::with_capacity(combinations.len());
        for combo in combinations {
            match &combo.skip_reason {
                Some(reason) => {
                    debug!(suffix = %combo.suffix, %reason, "skipping combination");
                    report.skipped_invalid += 1;
                }
                None => valid.push(combo),
            }
        }
        let count = valid.len();
        info!(
            total = report.total,
            valid = count,
            skipped = report.skipped_invalid,
            parallel = self.parallel,
            "starting sweep"
        );

        let compute = |(idx, combo): (usize, &Combination)| {
            let frame = annotate(base_frame, &combo.config, Some(&combo.suffix));
            progress_callback(idx, count, &combo.suffix);
            frame
        };
        let frames: Vec<DataFrame> = if self.parallel {
            valid.par_iter().enumerate().map(compute).collect()
        } else {
            valid.iter().enumerate().map(compute).collect()
        };

        let mut merged = base_frame.clone();
        for (combo, frame) in valid.iter().zip(frames) {
            let existing: HashSet<String> = merged
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
            let new_columns: Vec<Column> = frame
                .get_columns()
                .iter()
                .filter(|col| !existing.contains(col.name().as_str()))
                .cloned()
                .collect();

            if new_columns.is_empty() {
                warn!(suffix = %combo.suffix, "combination produced no new columns");
                report.empty.push(combo.suffix.clone());
                continue;
            }

            info!(suffix = %combo.suffix, columns = new_columns.len(), "merged combination");
            report.columns_added += new_columns.len();
            report.processed += 1;
            merged = merged
                .hstack(&new_columns)
                .with_context(|| format!("merge columns for {}", combo.suffix))?;
        }

        info!(
            processed = report.processed,
            empty = report.empty.len(),
            columns = merged.width(),
            "sweep complete"
        );
        Ok(SweepOutcome {
            frame: merged,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(lengths: Vec<usize>, signals: Vec<usize>, modes: Vec<MaMode>) -> ParamGrid {
        ParamGrid {
            forming_trend_thresholds: vec![25.0],
            trend_thresholds: vec![45.0],
            lengths,
            signal_lengths: signals,
            modes,
        }
    }

    #[test]
    fn test_param_grid_size() {
        // 2 × 3 × 6 × 3 × 5
        assert_eq!(ParamGrid::reference().size(), 540);
    }

    #[test]
    fn test_suffix_format() {
        let config = IndicatorConfig {
            length: 7,
            signal_length: 6,
            mode: MaMode::Rma,
            forming_trend_threshold: 20.0,
            trend_threshold: 40.0,
            ..IndicatorConfig::default()
        };
        assert_eq!(suffix(&config), "_ft20_tt40_len7_ls6_marma");

        let fractional = IndicatorConfig {
            forming_trend_threshold: 22.5,
            ..config
        };
        assert_eq!(suffix(&fractional), "_ft22.5_tt40_len7_ls6_marma");
    }

    #[test]
    fn test_combinations_keep_grid_order() {
        let combos = grid(vec![7, 10], vec![3], vec![MaMode::Rma, MaMode::Ema])
            .combinations(&IndicatorConfig::default());
        let suffixes: Vec<&str> = combos.iter().map(|c| c.suffix.as_str()).collect();
        assert_eq!(
            suffixes,
            vec![
                "_ft25_tt45_len7_ls3_marma",
                "_ft25_tt45_len7_ls3_maema",
                "_ft25_tt45_len10_ls3_marma",
                "_ft25_tt45_len10_ls3_maema",
            ]
        );
    }

    #[test]
    fn test_base_fields_carry_over() {
        let base = IndicatorConfig {
            scalar: 1.0,
            drift: 2,
            ..IndicatorConfig::default()
        };
        let combos = grid(vec![10], vec![6], vec![MaMode::Sma]).combinations(&base);
        assert_eq!(combos[0].config.scalar, 1.0);
        assert_eq!(combos[0].config.drift, 2);
    }

    #[test]
    fn test_filters_invalid_combinations() {
        let combos = grid(vec![7, 10], vec![3, 12], vec![MaMode::Hma, MaMode::Sma])
            .combinations(&IndicatorConfig::default());
        assert_eq!(combos.len(), 8);

        for combo in &combos {
            let c = &combo.config;
            let must_skip =
                c.signal_length > c.length || (c.mode == MaMode::Hma && c.signal_length < 4);
            assert_eq!(!combo.is_valid(), must_skip, "{}", combo.suffix);
        }
        // (7,12,*), (10,12,*) and (hma,3,*) go; (7,3,sma) and (10,3,sma) stay.
        assert_eq!(combos.iter().filter(|c| c.is_valid()).count(), 2);
    }

    #[test]
    fn test_inverted_thresholds_skipped() {
        let grid = ParamGrid {
            forming_trend_thresholds: vec![50.0],
            trend_thresholds: vec![40.0],
            lengths: vec![10],
            signal_lengths: vec![6],
            modes: vec![MaMode::Rma],
        };
        let combos = grid.combinations(&IndicatorConfig::default());
        assert!(!combos[0].is_valid());
    }

    #[test]
    fn test_empty_axes_reported() {
        let mut grid = ParamGrid::reference();
        grid.modes.clear();
        assert_eq!(grid.size(), 0);
        assert_eq!(grid.empty_axes(), vec!["modes"]);
    }

    #[test]
    fn test_grid_toml_accepts_short_aliases() {
        let grid: ParamGrid = toml::from_str(
            "forming_trend_thresholds = [20]\n\
             trend_thresholds = [40]\n\
             lengths = [7]\n\
             lensigs = [3]\n\
             mamodes = [\"rma\"]\n",
        )
        .unwrap();
        assert_eq!(grid.signal_lengths, vec![3]);
        assert_eq!(grid.modes, vec![MaMode::Rma]);
    }
}
