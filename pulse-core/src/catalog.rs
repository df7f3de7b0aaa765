//! Instrument catalogs.
//!
//! Each instrument carries a display name (surfaced as a signal's `market`)
//! and a reference price used by the periodic generator when it fabricates
//! demo signals. Prices are illustrative, not market data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{ValidationContext, Validatable, Validator};
use crate::error::ConfigError;

/// One tradable instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Instrument identifier, e.g. `BTC/USD`.
    pub symbol: String,
    /// Human-readable name, e.g. `Bitcoin`.
    pub name: String,
    /// Reference price for synthetic signals.
    pub base_price: f64,
}

impl Instrument {
    /// Creates an instrument.
    #[must_use]
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, base_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            base_price,
        }
    }
}

/// A named group of instruments (e.g. `crypto`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    /// Catalog name.
    pub name: String,
    /// Instruments in this catalog.
    pub instruments: Vec<Instrument>,
}

/// The union of all configured catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    catalogs: Vec<InstrumentCatalog>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            InstrumentCatalog {
                name: "crypto".to_string(),
                instruments: vec![
                    Instrument::new("BTC/USD", "Bitcoin", 60_000.0),
                    Instrument::new("ETH/USD", "Ethereum", 3_000.0),
                    Instrument::new("SOL/USD", "Solana", 150.0),
                    Instrument::new("XRP/USD", "Ripple", 0.55),
                ],
            },
            InstrumentCatalog {
                name: "forex".to_string(),
                instruments: vec![
                    Instrument::new("EUR/USD", "Euro / US Dollar", 1.085),
                    Instrument::new("GBP/USD", "British Pound / US Dollar", 1.27),
                    Instrument::new("USD/JPY", "US Dollar / Japanese Yen", 151.5),
                ],
            },
            InstrumentCatalog {
                name: "commodities".to_string(),
                instruments: vec![
                    Instrument::new("XAU/USD", "Gold", 2_350.0),
                    Instrument::new("XAG/USD", "Silver", 28.0),
                    Instrument::new("WTI/USD", "Crude Oil (WTI)", 78.0),
                ],
            },
        ])
    }
}

impl Catalog {
    /// Creates a catalog from the given groups.
    #[must_use]
    pub fn new(catalogs: Vec<InstrumentCatalog>) -> Self {
        Self { catalogs }
    }

    /// Returns the catalog groups.
    #[must_use]
    pub fn groups(&self) -> &[InstrumentCatalog] {
        &self.catalogs
    }

    /// Iterates every instrument across all groups, in declaration order.
    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.catalogs.iter().flat_map(|c| c.instruments.iter())
    }

    /// Returns the number of instruments across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.catalogs.iter().map(|c| c.instruments.len()).sum()
    }

    /// Returns true if no group holds any instrument.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the instrument at `index` in the flattened union.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Instrument> {
        self.instruments().nth(index)
    }

    /// Finds an instrument by symbol.
    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments().find(|i| i.symbol == symbol)
    }

    /// Returns the display name for `symbol`, falling back to the symbol itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.find(symbol).map_or(symbol, |i| i.name.as_str())
    }
}

impl Validatable for Catalog {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();
        ctx.enter("catalog");

        if self.is_empty() {
            ctx.add_error(ctx.invalid_value("instruments", "At least one instrument is required"));
        }

        let mut seen = HashSet::new();
        for group in &self.catalogs {
            ctx.enter(&group.name);
            for instrument in &group.instruments {
                let mut validator = Validator::new(&mut ctx);
                validator
                    .require_non_empty("symbol", &instrument.symbol)
                    .require_non_empty("name", &instrument.name)
                    .positive("base_price", &instrument.base_price);
                if !seen.insert(instrument.symbol.as_str()) {
                    ctx.add_error(ctx.invalid_value(
                        "symbol",
                        format!("Duplicate symbol '{}'", instrument.symbol),
                    ));
                }
            }
            ctx.exit();
        }

        ctx.exit();
        ctx.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert_eq!(catalog.groups().len(), 3);
        assert_eq!(catalog.len(), 10);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_display_name_lookup() {
        let catalog = Catalog::default();
        assert_eq!(catalog.display_name("BTC/USD"), "Bitcoin");
        assert_eq!(catalog.display_name("XAU/USD"), "Gold");
        assert_eq!(catalog.display_name("DOGE/USD"), "DOGE/USD");
    }

    #[test]
    fn test_get_flattens_groups() {
        let catalog = Catalog::default();
        assert_eq!(catalog.get(0).unwrap().symbol, "BTC/USD");
        assert_eq!(catalog.get(4).unwrap().symbol, "EUR/USD");
        assert_eq!(catalog.get(9).unwrap().symbol, "WTI/USD");
        assert!(catalog.get(10).is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let catalog = Catalog::new(vec![InstrumentCatalog {
            name: "crypto".to_string(),
            instruments: vec![
                Instrument::new("BTC/USD", "Bitcoin", 1.0),
                Instrument::new("BTC/USD", "Bitcoin again", 2.0),
            ],
        }]);
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let catalog = Catalog::new(vec![InstrumentCatalog {
            name: "forex".to_string(),
            instruments: vec![Instrument::new("EUR/USD", "Euro", 0.0)],
        }]);
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("catalog.forex.base_price"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(Catalog::new(Vec::new()).validate().is_err());
    }
}
