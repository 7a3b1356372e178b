//! ADXLab Core: bar series, ADX indicator engine, trend classification, data providers.
//!
//! This crate contains the heart of the tool:
//! - Domain types (bars, validated bar series, trend labels)
//! - Moving averages, true range and the ADX / +DI / -DI computation
//! - Scale normalization and bar-by-bar trend classification
//! - The engine that appends indicator and label columns to a polars table
//! - Series providers (Dukascopy, CSV, synthetic) and the instrument catalog

pub mod classify;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;

pub use config::{ConfigError, IndicatorConfig, WindowRule};
pub use domain::{Bar, BarSeries, SeriesError, TrendDirection, TrendStatus};
pub use engine::{annotate, try_annotate, AnnotatedColumns, Annotation, EngineError};
pub use indicators::MaMode;
