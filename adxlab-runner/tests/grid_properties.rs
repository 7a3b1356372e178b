//! Property tests for grid enumeration.
//!
//! 1. Enumeration yields exactly `size()` combinations
//! 2. Suffixes are unique across the grid
//! 3. A combination is valid iff it passes the window and threshold rules

use adxlab_core::{IndicatorConfig, MaMode};
use adxlab_runner::ParamGrid;
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_grid() -> impl Strategy<Value = ParamGrid> {
    (
        prop::collection::btree_set(10u32..30, 1..3),
        prop::collection::btree_set(30u32..60, 1..3),
        prop::collection::btree_set(1usize..40, 1..4),
        prop::collection::btree_set(1usize..20, 1..4),
        prop::sample::subsequence(MaMode::ALL.to_vec(), 1..=MaMode::ALL.len()),
    )
        .prop_map(|(ft, tt, lengths, signals, modes)| ParamGrid {
            forming_trend_thresholds: ft.into_iter().map(f64::from).collect(),
            trend_thresholds: tt.into_iter().map(f64::from).collect(),
            lengths: lengths.into_iter().collect(),
            signal_lengths: signals.into_iter().collect(),
            modes,
        })
}

proptest! {
    #[test]
    fn enumeration_matches_size(grid in arb_grid()) {
        let combos = grid.combinations(&IndicatorConfig::default());
        prop_assert_eq!(combos.len(), grid.size());
    }

    #[test]
    fn suffixes_are_unique(grid in arb_grid()) {
        let combos = grid.combinations(&IndicatorConfig::default());
        let suffixes: HashSet<&str> = combos.iter().map(|c| c.suffix.as_str()).collect();
        prop_assert_eq!(suffixes.len(), combos.len());
    }

    #[test]
    fn validity_follows_rules(grid in arb_grid()) {
        for combo in grid.combinations(&IndicatorConfig::default()) {
            let c = &combo.config;
            let breaks_window = c.signal_length > c.length
                || (c.mode == MaMode::Hma && c.signal_length < 4);
            let breaks_thresholds = c.forming_trend_threshold >= c.trend_threshold;
            prop_assert_eq!(combo.is_valid(), !breaks_window && !breaks_thresholds);
        }
    }
}
