//! Instrument catalog: Dukascopy identifiers grouped by asset class.
//!
//! The built-in registry is an explicit static table. A TOML file with a
//! `[groups]` table can replace it:
//!
//! ```toml
//! [groups]
//! FX = ["EUR/USD", "GBP/USD"]
//! CMD = ["XAU/USD"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Instruments printed per row by [`InstrumentCatalog::render_group`].
pub const LISTING_COLUMNS: usize = 4;
/// Padding added to the longest name to get the column width.
const COLUMN_GAP: usize = 3;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("group '{group}' not found; available groups: {}", available.join(", "))]
    UnknownGroup {
        group: String,
        available: Vec<String>,
    },

    #[error("read catalog file: {0}")]
    Io(String),

    #[error("parse catalog TOML: {0}")]
    Parse(String),
}

const FX: &[&str] = &[
    "AUD/CAD", "AUD/CHF", "AUD/JPY", "AUD/NZD", "AUD/USD", "CAD/CHF", "CAD/JPY", "CHF/JPY",
    "EUR/AUD", "EUR/CAD", "EUR/CHF", "EUR/GBP", "EUR/JPY", "EUR/NZD", "EUR/PLN", "EUR/USD",
    "GBP/AUD", "GBP/CHF", "GBP/JPY", "GBP/USD", "NZD/JPY", "NZD/USD", "USD/CAD", "USD/CHF",
    "USD/JPY", "USD/PLN",
];

const CMD: &[&str] = &[
    "BRENT.CMD/USD",
    "COCOA.CMD/USD",
    "COFFEE.CMD/USX",
    "COPPER.CMD/USD",
    "GAS.CMD/USD",
    "LIGHT.CMD/USD",
    "SOYBEAN.CMD/USX",
    "SUGAR.CMD/USD",
    "XAG/USD",
    "XAU/USD",
];

const IDX: &[&str] = &[
    "AUS.IDX/AUD",
    "CHE.IDX/CHF",
    "DEU.IDX/EUR",
    "EUS.IDX/EUR",
    "FRA.IDX/EUR",
    "GBR.IDX/GBP",
    "HKG.IDX/HKD",
    "JPN.IDX/JPY",
    "USA30.IDX/USD",
    "USA500.IDX/USD",
    "USATECH.IDX/USD",
];

const VCCY: &[&str] = &[
    "ADA/USD", "BCH/USD", "BTC/USD", "DOT/USD", "ETH/USD", "LNK/USD", "LTC/USD", "XRP/USD",
];

const BND: &[&str] = &["BUND.TR/EUR", "UKGILT.TR/GBP", "USTBOND.TR/USD"];

/// Instruments grouped by asset class. Group names are upper case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    groups: BTreeMap<String, Vec<String>>,
}

impl InstrumentCatalog {
    /// The built-in registry.
    pub fn builtin() -> Self {
        let table: [(&str, &[&str]); 5] = [
            ("FX", FX),
            ("CMD", CMD),
            ("IDX", IDX),
            ("VCCY", VCCY),
            ("BND", BND),
        ];
        Self::from_groups(
            table
                .iter()
                .map(|(g, names)| (g.to_string(), names.iter().map(|n| n.to_string()).collect())),
        )
    }

    /// Build a catalog, normalizing group names and sorting each group.
    pub fn from_groups(groups: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (group, names) in groups {
            map.entry(group.to_ascii_uppercase()).or_default().extend(names);
        }
        for names in map.values_mut() {
            names.sort();
            names.dedup();
        }
        Self { groups: map }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let raw: InstrumentCatalog =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self::from_groups(raw.groups))
    }

    /// Sorted group names.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|g| g.as_str()).collect()
    }

    /// Sorted instruments of a group; the lookup ignores case.
    pub fn instruments(&self, group: &str) -> Result<&[String], CatalogError> {
        self.groups
            .get(&group.to_ascii_uppercase())
            .map(|v| v.as_slice())
            .ok_or_else(|| CatalogError::UnknownGroup {
                group: group.to_ascii_uppercase(),
                available: self.groups.keys().cloned().collect(),
            })
    }

    pub fn instrument_count(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }

    /// Numbered listing of the groups.
    pub fn render_groups(&self) -> String {
        let mut out = String::from("Available instrument groups:\n");
        for (i, group) in self.groups.keys().enumerate() {
            out.push_str(&format!("  {}. {group}\n", i + 1));
        }
        out
    }

    /// One group's instruments in rows of [`LISTING_COLUMNS`] left-justified
    /// cells, each as wide as the longest name plus three.
    pub fn render_group(&self, group: &str) -> Result<String, CatalogError> {
        let names = self.instruments(group)?;
        let width = names.iter().map(|n| n.len()).max().unwrap_or(0) + COLUMN_GAP;

        let mut out = format!("Instruments in group: === {} ===\n", group.to_ascii_uppercase());
        for row in names.chunks(LISTING_COLUMNS) {
            for name in row {
                out.push_str(&format!("{name:<width$}"));
            }
            out.push('\n');
        }
        Ok(out)
    }

    pub fn to_toml(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
