//! Domain types for ADXLab

pub mod bar;
pub mod series;
pub mod trend;

pub use bar::Bar;
pub use series::{BarSeries, SeriesError, BASE_COLUMNS};
pub use trend::{TrendDirection, TrendStatus};

/// Instrument identifier type alias (e.g. "EUR/USD").
pub type InstrumentId = String;
