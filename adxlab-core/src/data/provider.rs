//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over data sources (Dukascopy, CSV files,
//! synthetic data) so we can swap implementations and mock for tests. A fetch
//! is a single blocking call; retries and timeouts belong to the caller.

use crate::domain::{BarSeries, SeriesError};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output as well as logs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} while fetching {instrument}")]
    HttpStatus { status: u16, instrument: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("instrument not found: {instrument}")]
    InstrumentNotFound { instrument: String },

    #[error("invalid date range: start {start} is not before end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("csv error: {0}")]
    Csv(String),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

/// Bar interval as named by the Dukascopy feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1MIN")]
    OneMinute,
    #[serde(rename = "5MIN")]
    FiveMinutes,
    #[serde(rename = "10MIN")]
    TenMinutes,
    #[serde(rename = "15MIN")]
    FifteenMinutes,
    #[serde(rename = "30MIN")]
    ThirtyMinutes,
    #[serde(rename = "1HOUR")]
    OneHour,
    #[serde(rename = "4HOUR")]
    FourHours,
    #[default]
    #[serde(rename = "1DAY")]
    OneDay,
    #[serde(rename = "1WEEK")]
    OneWeek,
    #[serde(rename = "1MONTH")]
    OneMonth,
}

impl Interval {
    pub const ALL: [Interval; 10] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::TenMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1MIN",
            Interval::FiveMinutes => "5MIN",
            Interval::TenMinutes => "10MIN",
            Interval::FifteenMinutes => "15MIN",
            Interval::ThirtyMinutes => "30MIN",
            Interval::OneHour => "1HOUR",
            Interval::FourHours => "4HOUR",
            Interval::OneDay => "1DAY",
            Interval::OneWeek => "1WEEK",
            Interval::OneMonth => "1MONTH",
        }
    }

    /// Nominal bar length; a month counts as 30 days.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::OneMinute => Duration::minutes(1),
            Interval::FiveMinutes => Duration::minutes(5),
            Interval::TenMinutes => Duration::minutes(10),
            Interval::FifteenMinutes => Duration::minutes(15),
            Interval::ThirtyMinutes => Duration::minutes(30),
            Interval::OneHour => Duration::hours(1),
            Interval::FourHours => Duration::hours(4),
            Interval::OneDay => Duration::days(1),
            Interval::OneWeek => Duration::weeks(1),
            Interval::OneMonth => Duration::days(30),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == upper)
            .ok_or_else(|| format!("unknown interval '{s}'"))
    }
}

/// Which side of the book the prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OfferSide {
    #[default]
    #[serde(rename = "B")]
    Bid,
    #[serde(rename = "A")]
    Ask,
}

impl OfferSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferSide::Bid => "B",
            OfferSide::Ask => "A",
        }
    }
}

impl fmt::Display for OfferSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "B" | "BID" => Ok(OfferSide::Bid),
            "A" | "ASK" => Ok(OfferSide::Ask),
            _ => Err(format!("unknown offer side '{s}' (expected B or A)")),
        }
    }
}

/// One request for a bar series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub instrument: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval: Interval,
    pub offer_side: OfferSide,
}

impl FetchRequest {
    /// Request covering whole calendar days: `start` from midnight through the
    /// last millisecond of `end`.
    pub fn for_days(
        instrument: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
        offer_side: OfferSide,
    ) -> Self {
        let end = end
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN) - Duration::milliseconds(1))
            .unwrap_or_else(|| end.and_time(NaiveTime::MIN));
        Self {
            instrument: instrument.into(),
            start: start.and_time(NaiveTime::MIN),
            end,
            interval,
            offer_side,
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.start >= self.end {
            return Err(DataError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Trait for bar series providers (Dukascopy, CSV import, etc).
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the bars covering the request's range.
    fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError>;
}

/// Fetch a series, converting any failure into the empty-series sentinel.
///
/// The failure is logged; callers check `is_empty()` and stop gracefully.
pub fn fetch_or_empty(provider: &dyn SeriesProvider, request: &FetchRequest) -> BarSeries {
    info!(
        provider = provider.name(),
        instrument = %request.instrument,
        start = %request.start.date(),
        end = %request.end.date(),
        interval = %request.interval,
        "fetching bars"
    );
    match request.validate().and_then(|_| provider.fetch(request)) {
        Ok(series) => {
            info!(bars = series.len(), "fetch complete");
            series
        }
        Err(e) => {
            warn!(
                provider = provider.name(),
                instrument = %request.instrument,
                error = %e,
                "fetch failed, continuing with an empty series"
            );
            BarSeries::empty()
        }
    }
}
