//! Data layer: series providers and the instrument catalog.

pub mod catalog;
pub mod csv_provider;
pub mod dukascopy;
pub mod provider;
pub mod synthetic;

pub use catalog::{CatalogError, InstrumentCatalog};
pub use csv_provider::CsvProvider;
pub use dukascopy::DukascopyProvider;
pub use provider::{fetch_or_empty, DataError, FetchRequest, Interval, OfferSide, SeriesProvider};
pub use synthetic::SyntheticProvider;
