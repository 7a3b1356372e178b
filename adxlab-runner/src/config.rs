//! Serializable sweep configuration.
//!
//! A sweep file names the instrument and date range to fetch, the base
//! indicator settings, and the grid to search:
//!
//! ```toml
//! instrument = "EUR/USD"
//! start = "2000-01-01"
//! end = "2024-12-31"
//! interval = "1DAY"
//! offer_side = "B"
//! parallel = false
//!
//! [indicator]
//! scalar = 100
//!
//! [grid]
//! forming_trend_thresholds = [20, 25]
//! trend_thresholds = [40, 45, 50]
//! lengths = [7, 10, 15, 20, 25, 30]
//! signal_lengths = [3, 6, 10]
//! modes = ["rma", "ema", "hma", "dema", "tema"]
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use adxlab_core::data::{FetchRequest, Interval, OfferSide};
use adxlab_core::IndicatorConfig;

use crate::sweep::ParamGrid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub instrument: String,

    /// First day fetched (inclusive).
    pub start: NaiveDate,

    /// Last day fetched (inclusive).
    pub end: NaiveDate,

    #[serde(default)]
    pub interval: Interval,

    #[serde(default)]
    pub offer_side: OfferSide,

    #[serde(default)]
    pub parallel: bool,

    /// Values for the fields the grid does not vary.
    #[serde(default)]
    pub indicator: IndicatorConfig,

    #[serde(default)]
    pub grid: ParamGrid,
}

impl SweepConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read sweep config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("load {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SweepConfig = toml::from_str(content).context("parse sweep TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.instrument.trim().is_empty() {
            bail!("instrument must not be empty");
        }
        if self.start >= self.end {
            bail!("start {} must be before end {}", self.start, self.end);
        }
        let empty = self.grid.empty_axes();
        if !empty.is_empty() {
            bail!("grid axes without values: {}", empty.join(", "));
        }
        self.indicator.validate().context("base indicator config")?;
        Ok(())
    }

    /// Request covering `start` 00:00 through the end of `end`.
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest::for_days(
            self.instrument.clone(),
            self.start,
            self.end,
            self.interval,
            self.offer_side,
        )
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize sweep config")
    }
}
