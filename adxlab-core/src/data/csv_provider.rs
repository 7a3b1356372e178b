//! CSV import provider.
//!
//! Reads `timestamp,open,high,low,close,volume` files from a directory, one
//! file per instrument. The file name is the instrument with every
//! non-alphanumeric character removed: `EUR/USD` → `EURUSD.csv`.
//!
//! Accepted timestamp forms: RFC 3339, `YYYY-MM-DD HH:MM:SS`,
//! `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or integer epoch milliseconds.

use super::provider::{DataError, FetchRequest, SeriesProvider};
use crate::domain::{Bar, BarSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Provider backed by a directory of per-instrument CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File that holds `instrument`'s bars.
    pub fn path_for(&self, instrument: &str) -> PathBuf {
        let stem: String = instrument
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        self.dir.join(format!("{stem}.csv"))
    }
}

impl SeriesProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        request.validate()?;
        let path = self.path_for(&request.instrument);
        if !path.exists() {
            return Err(DataError::InstrumentNotFound {
                instrument: request.instrument.clone(),
            });
        }
        let bars = read_bars(&path)?;
        debug!(path = %path.display(), rows = bars.len(), "read csv");
        Ok(BarSeries::from_unordered(bars).within(request.start, request.end))
    }
}

/// Read every row of a bar CSV file.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            let row = row.map_err(|e| DataError::Csv(format!("row {}: {e}", i + 1)))?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                DataError::Csv(format!("row {}: bad timestamp '{}'", i + 1, row.timestamp))
            })?;
            Ok(Bar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0.0),
            })
        })
        .collect()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
}
