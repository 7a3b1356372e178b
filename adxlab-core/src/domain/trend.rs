//! Categorical trend labels attached to each bar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend phase derived from index strength and momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendStatus {
    Trending,
    Forming,
    Consolidation,
}

impl TrendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Trending => "Trending",
            TrendStatus::Forming => "Forming",
            TrendStatus::Consolidation => "Consolidation",
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the trend; `Lateral` whenever there is no trend to speak of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    Upward,
    Downward,
    Lateral,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Upward => "Upward",
            TrendDirection::Downward => "Downward",
            TrendDirection::Lateral => "Lateral",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
