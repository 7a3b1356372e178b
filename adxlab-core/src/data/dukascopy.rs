//! Dukascopy data provider.
//!
//! Fetches OHLCV candles from Dukascopy's public chart feed. The feed answers
//! with a JSONP-wrapped array of `[timestamp_ms, open, high, low, close, volume]`
//! rows and a bounded page size, so a range is walked forward page by page.

use super::provider::{DataError, FetchRequest, SeriesProvider};
use crate::domain::{Bar, BarSeries};
use chrono::DateTime;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://freeserv.dukascopy.com/2.0/index.php";
const REFERER: &str = "https://freeserv.dukascopy.com/2.0/";
const JSONP_CALLBACK: &str = "_callbacks____adxlab";

/// Upper bound on pages per fetch.
const MAX_PAGES: usize = 10_000;

/// Dukascopy chart-feed provider.
pub struct DukascopyProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl DukascopyProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_timeout(None)
    }

    /// Build a provider whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different feed URL (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one page of candles starting at `from_ms`.
    fn fetch_page(&self, request: &FetchRequest, from_ms: i64) -> Result<Vec<Bar>, DataError> {
        let from = from_ms.to_string();
        let query = [
            ("path", "chart/json3"),
            ("instrument", request.instrument.as_str()),
            ("offer_side", request.offer_side.as_str()),
            ("interval", request.interval.as_str()),
            ("splits", "true"),
            ("stocks", "true"),
            ("time_direction", "N"),
            ("timestamp", from.as_str()),
            ("jsonp", JSONP_CALLBACK),
        ];

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::InstrumentNotFound {
                instrument: request.instrument.clone(),
            });
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                instrument: request.instrument.clone(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        parse_page(&body)
    }
}

impl SeriesProvider for DukascopyProvider {
    fn name(&self) -> &str {
        "dukascopy"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        request.validate()?;

        let start_ms = request.start.and_utc().timestamp_millis();
        let end_ms = request.end.and_utc().timestamp_millis();
        let mut cursor = start_ms;
        let mut bars = Vec::new();

        for page in 0..MAX_PAGES {
            let batch = self.fetch_page(request, cursor)?;
            let last_ms = match batch.last() {
                Some(bar) => bar.timestamp.and_utc().timestamp_millis(),
                None => break,
            };
            debug!(page, rows = batch.len(), "dukascopy page");
            bars.extend(batch);

            // Stop at the end of the range or when the feed stops advancing.
            if last_ms >= end_ms || last_ms < cursor {
                break;
            }
            cursor = last_ms + 1;
        }

        Ok(BarSeries::from_unordered(bars).within(request.start, request.end))
    }
}

/// Parse one feed page, with or without its JSONP wrapper.
pub fn parse_page(body: &str) -> Result<Vec<Bar>, DataError> {
    let trimmed = body.trim();
    let json = match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if !trimmed.starts_with('[') && open < close => {
            &trimmed[open + 1..close]
        }
        _ => trimmed,
    };

    let rows: Vec<Vec<f64>> = serde_json::from_str(json)
        .map_err(|e| DataError::ResponseFormatChanged(format!("candle rows: {e}")))?;

    rows.into_iter()
        .map(|row| {
            if row.len() < 6 {
                return Err(DataError::ResponseFormatChanged(format!(
                    "expected 6 fields per candle, got {}",
                    row.len()
                )));
            }
            let millis = row[0] as i64;
            let timestamp = DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {millis}"))
                })?;
            Ok(Bar {
                timestamp,
                open: row[1],
                high: row[2],
                low: row[3],
                close: row[4],
                volume: row[5],
            })
        })
        .collect()
}
