//! BarSeries: a validated, time-ordered run of bars and its tabular form.
//!
//! The series is the unit handed from a provider to the indicator engine.
//! Construction enforces strictly increasing timestamps; the table form is a
//! polars `DataFrame` with one row per bar so derived columns can be appended
//! alongside the OHLCV data.

use super::bar::Bar;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

/// Column names of the base bar table, in order.
pub const BASE_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("timestamps must be strictly increasing: bar {index} at {current} follows {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Ordered sequence of bars with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate ordering and wrap the bars.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp {
                    index: i + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by timestamp and drop duplicate timestamps (first occurrence wins).
    ///
    /// Providers use this to normalize pages that overlap at their edges.
    pub fn from_unordered(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    /// The empty-result sentinel returned when a fetch fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Keep only bars with `start <= timestamp <= end`.
    pub fn within(self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let bars = self
            .bars
            .into_iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .collect();
        Self { bars }
    }

    /// Convert to the base bar table.
    pub fn to_frame(&self) -> Result<DataFrame, SeriesError> {
        let millis: Vec<i64> = self
            .bars
            .iter()
            .map(|b| b.timestamp.and_utc().timestamp_millis())
            .collect();
        let opens: Vec<f64> = self.bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = self.bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = self.bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = self.bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = self.bars.iter().map(|b| b.volume).collect();

        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            Column::new("open".into(), opens),
            Column::new("high".into(), highs),
            Column::new("low".into(), lows),
            Column::new("close".into(), closes),
            Column::new("volume".into(), volumes),
        ])?;
        Ok(df)
    }

    /// Rebuild a series from a table carrying the base columns.
    ///
    /// Extra columns are ignored. Null prices come back as NaN; a null
    /// timestamp is an error.
    pub fn from_frame(df: &DataFrame) -> Result<Self, SeriesError> {
        for name in BASE_COLUMNS {
            if df.column(name).is_err() {
                return Err(SeriesError::MissingColumn(name.to_string()));
            }
        }

        let ts = df.column("timestamp")?.cast(&DataType::Int64)?;
        let ts = ts.i64()?;
        let open = float_column(df, "open")?;
        let high = float_column(df, "high")?;
        let low = float_column(df, "low")?;
        let close = float_column(df, "close")?;
        let volume = float_column(df, "volume")?;

        let mut bars = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let millis = ts.get(row).ok_or_else(|| SeriesError::NullValue {
                column: "timestamp".into(),
                row,
            })?;
            let timestamp = DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| SeriesError::NullValue {
                    column: "timestamp".into(),
                    row,
                })?;
            bars.push(Bar {
                timestamp,
                open: open[row],
                high: high[row],
                low: low[row],
                close: close[row],
                volume: volume[row],
            });
        }

        Self::new(bars)
    }
}

/// Read a numeric column as `f64`, mapping nulls to NaN.
///
/// Integer columns are cast, so a provider emitting integral volume still loads.
pub fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, SeriesError> {
    let col = df
        .column(name)
        .map_err(|_| SeriesError::MissingColumn(name.to_string()))?
        .cast(&DataType::Float64)?;
    Ok(col
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar_at(day: i64, close: f64) -> Bar {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Bar {
            timestamp: base + Duration::days(day),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = BarSeries::new(vec![bar_at(0, 1.0), bar_at(0, 2.0)]).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::NonIncreasingTimestamp { index: 1, .. }
        ));
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let result = BarSeries::new(vec![bar_at(1, 1.0), bar_at(0, 2.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn from_unordered_sorts_and_dedups() {
        let series = BarSeries::from_unordered(vec![bar_at(2, 3.0), bar_at(0, 1.0), bar_at(2, 9.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 1.0);
        assert_eq!(series.bars()[1].close, 3.0);
    }

    #[test]
    fn frame_roundtrip_preserves_bars() {
        let series = BarSeries::new((0..5).map(|i| bar_at(i, 10.0 + i as f64)).collect()).unwrap();
        let df = series.to_frame().unwrap();
        assert_eq!(df.height(), 5);
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, BASE_COLUMNS.to_vec());

        let back = BarSeries::from_frame(&df).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn from_frame_reports_missing_column() {
        let series = BarSeries::new(vec![bar_at(0, 1.0)]).unwrap();
        let df = series.to_frame().unwrap().drop("close").unwrap();
        let err = BarSeries::from_frame(&df).unwrap_err();
        assert!(matches!(err, SeriesError::MissingColumn(c) if c == "close"));
    }

    #[test]
    fn within_filters_inclusive_range() {
        let series = BarSeries::new((0..10).map(|i| bar_at(i, i as f64)).collect()).unwrap();
        let start = series.bars()[2].timestamp;
        let end = series.bars()[4].timestamp;
        let cut = series.within(start, end);
        assert_eq!(cut.len(), 3);
    }

    #[test]
    fn empty_series_builds_empty_frame() {
        let df = BarSeries::empty().to_frame().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), BASE_COLUMNS.len());
    }
}
