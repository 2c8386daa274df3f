//! In-memory quote providers for updater tests.

use chrono::{Datelike, Duration, NaiveDate};
use phtoolz_core::{Amount, Commodity, CommodityKind, PriceRecord};
use phtoolz_quotes::{CommodityClassifier, PriceSource, QuoteError, QuoteResult};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// Classifier backed by a fixed table; unlisted symbols are `Unknown`.
#[derive(Default)]
pub struct FixedKinds {
    kinds: HashMap<String, CommodityKind>,
    calls: RefCell<Vec<String>>,
}

impl FixedKinds {
    pub fn with(mut self, symbol: &str, kind: CommodityKind) -> Self {
        self.kinds.insert(symbol.to_string(), kind);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommodityClassifier for FixedKinds {
    fn classify(&self, commodity: &Commodity) -> QuoteResult<CommodityKind> {
        self.calls.borrow_mut().push(commodity.as_str().to_string());
        Ok(self
            .kinds
            .get(commodity.as_str())
            .copied()
            .unwrap_or(CommodityKind::Unknown))
    }
}

/// One USD close per calendar day, valued at the day of the year.
#[derive(Default)]
pub struct DailyCloses {
    requests: RefCell<Vec<(NaiveDate, NaiveDate)>>,
    fail_with_status: Option<u16>,
}

impl DailyCloses {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.requests.borrow().clone()
    }
}

impl PriceSource for DailyCloses {
    fn closing_prices(
        &self,
        commodities: &BTreeSet<Commodity>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> QuoteResult<Vec<PriceRecord>> {
        self.requests.borrow_mut().push((from, to));

        if let Some(status) = self.fail_with_status {
            let symbol = commodities
                .iter()
                .next()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default();
            return Err(QuoteError::Status { symbol, status });
        }

        let mut closes = Vec::new();
        for commodity in commodities {
            let mut day = from;
            while day < to {
                closes.push(PriceRecord::new(
                    day,
                    commodity.clone(),
                    Amount::new(Decimal::from(day.ordinal()), Commodity::new("USD")),
                ));
                day += Duration::days(1);
            }
        }
        Ok(closes)
    }
}
