//! Indicator configuration and its validation rules.
//!
//! Two kinds of rule apply:
//! - structural rules (`validate`): non-zero windows, finite scalar, and
//!   `forming_trend_threshold < trend_threshold`. Deserialization enforces them.
//! - window rules (`window_rule_violation`): `signal_length <= length` and the
//!   Hull minimum window. The engine computes regardless (an undefined average
//!   yields missing values); the sweep skips combinations that break them.

use crate::indicators::{MaMode, HULL_MIN_PERIOD};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_LENGTH: usize = 14;
pub const DEFAULT_SCALAR: f64 = 100.0;
pub const DEFAULT_FORMING_TREND_THRESHOLD: f64 = 25.0;
pub const DEFAULT_TREND_THRESHOLD: f64 = 45.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("length must be >= 1")]
    ZeroLength,

    #[error("signal_length must be >= 1")]
    ZeroSignalLength,

    #[error("drift must be >= 1")]
    ZeroDrift,

    #[error("scalar must be finite and non-zero, got {0}")]
    InvalidScalar(f64),

    #[error("thresholds must be finite, got forming={forming} trend={trend}")]
    NonFiniteThreshold { forming: f64, trend: f64 },

    #[error("forming_trend_threshold ({forming}) must be below trend_threshold ({trend})")]
    ThresholdOrder { forming: f64, trend: f64 },
}

/// A window rule a configuration breaks; sweeps skip such combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRule {
    SignalExceedsLength { signal_length: usize, length: usize },
    HullWindowTooShort { signal_length: usize },
}

impl fmt::Display for WindowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowRule::SignalExceedsLength {
                signal_length,
                length,
            } => write!(f, "signal_length {signal_length} exceeds length {length}"),
            WindowRule::HullWindowTooShort { signal_length } => write!(
                f,
                "hma needs signal_length >= {HULL_MIN_PERIOD}, got {signal_length}"
            ),
        }
    }
}

/// Parameters for one ADX computation plus the classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIndicatorConfig")]
pub struct IndicatorConfig {
    /// Lookback window for directional movement and ATR.
    pub length: usize,
    /// Smoothing window applied to DX to produce ADX.
    pub signal_length: usize,
    /// Moving-average family for DM and DX smoothing.
    pub mode: MaMode,
    /// Multiplier applied to the DI and DX ratios (100 for percentages).
    pub scalar: f64,
    /// Bars between the two highs/lows compared for directional movement.
    pub drift: usize,
    /// Shift applied to the output series (positive = later).
    pub offset: isize,
    pub forming_trend_threshold: f64,
    pub trend_threshold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self::with_length(DEFAULT_LENGTH)
    }
}

impl IndicatorConfig {
    /// Defaults with `length` and a matching `signal_length`.
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            signal_length: length,
            mode: MaMode::Rma,
            scalar: DEFAULT_SCALAR,
            drift: 1,
            offset: 0,
            forming_trend_threshold: DEFAULT_FORMING_TREND_THRESHOLD,
            trend_threshold: DEFAULT_TREND_THRESHOLD,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.signal_length == 0 {
            return Err(ConfigError::ZeroSignalLength);
        }
        if self.drift == 0 {
            return Err(ConfigError::ZeroDrift);
        }
        if !self.scalar.is_finite() || self.scalar == 0.0 {
            return Err(ConfigError::InvalidScalar(self.scalar));
        }
        let (forming, trend) = (self.forming_trend_threshold, self.trend_threshold);
        if !forming.is_finite() || !trend.is_finite() {
            return Err(ConfigError::NonFiniteThreshold { forming, trend });
        }
        if forming >= trend {
            return Err(ConfigError::ThresholdOrder { forming, trend });
        }
        Ok(())
    }

    /// First window rule this configuration breaks, if any.
    pub fn window_rule_violation(&self) -> Option<WindowRule> {
        if self.signal_length > self.length {
            return Some(WindowRule::SignalExceedsLength {
                signal_length: self.signal_length,
                length: self.length,
            });
        }
        if self.mode == MaMode::Hma && self.signal_length < HULL_MIN_PERIOD {
            return Some(WindowRule::HullWindowTooShort {
                signal_length: self.signal_length,
            });
        }
        None
    }
}

/// Wire form: every field optional, `signal_length` falls back to `length`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawIndicatorConfig {
    length: Option<usize>,
    signal_length: Option<usize>,
    #[serde(alias = "mamode")]
    mode: Option<MaMode>,
    scalar: Option<f64>,
    drift: Option<usize>,
    offset: Option<isize>,
    forming_trend_threshold: Option<f64>,
    trend_threshold: Option<f64>,
}

impl TryFrom<RawIndicatorConfig> for IndicatorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawIndicatorConfig) -> Result<Self, Self::Error> {
        let length = raw.length.unwrap_or(DEFAULT_LENGTH);
        let defaults = IndicatorConfig::with_length(length);
        let config = IndicatorConfig {
            length,
            signal_length: raw.signal_length.unwrap_or(length),
            mode: raw.mode.unwrap_or(defaults.mode),
            scalar: raw.scalar.unwrap_or(defaults.scalar),
            drift: raw.drift.unwrap_or(defaults.drift),
            offset: raw.offset.unwrap_or(defaults.offset),
            forming_trend_threshold: raw
                .forming_trend_threshold
                .unwrap_or(defaults.forming_trend_threshold),
            trend_threshold: raw.trend_threshold.unwrap_or(defaults.trend_threshold),
        };
        config.validate()?;
        Ok(config)
    }
}
