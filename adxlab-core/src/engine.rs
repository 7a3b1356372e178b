//! Indicator engine: appends ADX columns and trend labels to a bar table.
//!
//! Output columns, each followed by the optional suffix:
//! - `ADX_<signal_length>`, `DMP_<length>`, `DMN_<length>` (nulls where undefined)
//! - `DMP_<length>_scaled` / `DMN_<length>_scaled` when the raw DI series is on
//!   the unit-fraction scale
//! - `trend_status`, `trend_direction`
//!
//! The input columns are never modified. When the inputs cannot be read the
//! engine logs a warning and hands back the input table unchanged.

use crate::classify::{classify_series, to_percent_scale, Thresholds};
use crate::config::IndicatorConfig;
use crate::domain::series::{float_column, SeriesError};
use crate::indicators::{Adx, DirectionalIndex};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

pub const STATUS_COLUMN: &str = "trend_status";
pub const DIRECTION_COLUMN: &str = "trend_direction";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input column unavailable: {0}")]
    Input(#[from] SeriesError),

    #[error("indicator output has {got} rows, expected {expected}")]
    Misaligned { expected: usize, got: usize },

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Names of the columns one annotation pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedColumns {
    pub index: String,
    pub positive: String,
    pub negative: String,
    pub positive_scaled: Option<String>,
    pub negative_scaled: Option<String>,
    pub status: String,
    pub direction: String,
}

impl AnnotatedColumns {
    /// All produced column names, in the order they were appended.
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![
            self.index.as_str(),
            self.positive.as_str(),
            self.negative.as_str(),
        ];
        names.extend(self.positive_scaled.as_deref());
        names.extend(self.negative_scaled.as_deref());
        names.push(self.status.as_str());
        names.push(self.direction.as_str());
        names
    }

    /// Column whose values drive the +DI side of classification.
    pub fn effective_positive(&self) -> &str {
        self.positive_scaled.as_deref().unwrap_or(&self.positive)
    }

    /// Column whose values drive the -DI side of classification.
    pub fn effective_negative(&self) -> &str {
        self.negative_scaled.as_deref().unwrap_or(&self.negative)
    }
}

/// Augmented table together with the names of the added columns.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub frame: DataFrame,
    pub columns: AnnotatedColumns,
}

/// Annotate `df` with ADX columns and trend labels.
///
/// Never fails: on error the input is returned unchanged and a warning is logged.
pub fn annotate(df: &DataFrame, config: &IndicatorConfig, suffix: Option<&str>) -> DataFrame {
    match try_annotate(df, config, suffix) {
        Ok(annotation) => annotation.frame,
        Err(e) => {
            warn!(error = %e, "could not compute ADX columns, returning input unchanged");
            df.clone()
        }
    }
}

/// Fallible form of [`annotate`] that also reports the produced column names.
pub fn try_annotate(
    df: &DataFrame,
    config: &IndicatorConfig,
    suffix: Option<&str>,
) -> Result<Annotation, EngineError> {
    let rows = df.height();
    let high = float_column(df, "high")?;
    let low = float_column(df, "low")?;
    let close = float_column(df, "close")?;

    let adx = Adx::new(config);
    let di = adx.compute_hlc(&high, &low, &close);
    if !di.is_aligned_with(rows) {
        return Err(EngineError::Misaligned {
            expected: rows,
            got: di.len(),
        });
    }

    let suffix = suffix.unwrap_or("");
    let named = |base: &str| format!("{base}{suffix}");

    let DirectionalIndex {
        index,
        positive,
        negative,
    } = di;

    let positive_scaled = to_percent_scale(&positive);
    let negative_scaled = to_percent_scale(&negative);

    let thresholds = Thresholds {
        forming: config.forming_trend_threshold,
        trending: config.trend_threshold,
    };
    let (status, direction) = classify_series(
        &index,
        positive_scaled.as_deref().unwrap_or(&positive),
        negative_scaled.as_deref().unwrap_or(&negative),
        thresholds,
    );

    let columns = AnnotatedColumns {
        index: named(&adx.index_name()),
        positive: named(&adx.positive_name()),
        negative: named(&adx.negative_name()),
        positive_scaled: positive_scaled
            .as_ref()
            .map(|_| named(&format!("{}_scaled", adx.positive_name()))),
        negative_scaled: negative_scaled
            .as_ref()
            .map(|_| named(&format!("{}_scaled", adx.negative_name()))),
        status: named(STATUS_COLUMN),
        direction: named(DIRECTION_COLUMN),
    };

    let mut frame = df.clone();
    frame.with_column(nullable(&columns.index, &index))?;
    frame.with_column(nullable(&columns.positive, &positive))?;
    frame.with_column(nullable(&columns.negative, &negative))?;
    if let (Some(name), Some(values)) = (&columns.positive_scaled, &positive_scaled) {
        debug!(column = %name, "+DI on unit scale, added percentage companion");
        frame.with_column(nullable(name, values))?;
    }
    if let (Some(name), Some(values)) = (&columns.negative_scaled, &negative_scaled) {
        debug!(column = %name, "-DI on unit scale, added percentage companion");
        frame.with_column(nullable(name, values))?;
    }

    let status: Vec<&str> = status.iter().map(|s| s.as_str()).collect();
    let direction: Vec<&str> = direction.iter().map(|d| d.as_str()).collect();
    frame.with_column(Column::new(columns.status.as_str().into(), status))?;
    frame.with_column(Column::new(columns.direction.as_str().into(), direction))?;

    Ok(Annotation { frame, columns })
}

/// Float column with NaN mapped to null.
fn nullable(name: &str, values: &[f64]) -> Column {
    let values: Vec<Option<f64>> = values
        .iter()
        .map(|v| if v.is_nan() { None } else { Some(*v) })
        .collect();
    Column::new(name.into(), values)
}
