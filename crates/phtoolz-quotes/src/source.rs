//! Seams between the updater and external quote providers.

use crate::error::QuoteResult;
use chrono::NaiveDate;
use phtoolz_core::{Commodity, CommodityKind, PriceRecord};
use std::collections::BTreeSet;

/// Decides what kind of asset a ledger commodity is.
pub trait CommodityClassifier {
    fn classify(&self, commodity: &Commodity) -> QuoteResult<CommodityKind>;
}

/// Provides daily closing prices.
pub trait PriceSource {
    /// Closing prices for every commodity in `commodities` dated within
    /// `[from, to)`. The cadence of returned points is up to the source.
    fn closing_prices(
        &self,
        commodities: &BTreeSet<Commodity>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> QuoteResult<Vec<PriceRecord>>;
}
