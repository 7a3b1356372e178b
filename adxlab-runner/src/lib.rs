//! ADXLab Runner: parameter sweeps over the ADX engine.
//!
//! This crate builds on `adxlab-core` to provide:
//! - Parameter grid enumeration with window-rule filtering
//! - Sweep execution (sequential or rayon-parallel) merged into one wide table
//! - TOML sweep configuration
//! - Structure summaries of result tables

pub mod config;
pub mod summary;
pub mod sweep;

pub use config::SweepConfig;
pub use summary::{ColumnSummary, TableSummary};
pub use sweep::{suffix, Combination, ParamGrid, ParamSweep, SweepOutcome, SweepReport};
