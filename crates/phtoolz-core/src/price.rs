//! Price directives.

use crate::amount::Amount;
use crate::commodity::Commodity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of one unit of `commodity` on `date`.
///
/// Ordered by date, then commodity, then value. Two records describe the
/// same price point when their `key()` matches, regardless of value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub commodity: Commodity,
    pub value: Amount,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, commodity: Commodity, value: Amount) -> Self {
        Self {
            date,
            commodity,
            value,
        }
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (NaiveDate, &Commodity) {
        (self.date, &self.commodity)
    }
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.commodity,
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_price_fmt() {
        let record = PriceRecord::new(
            date(2016, 2, 7),
            Commodity::new("MUTF2351"),
            Amount::new(dec!(5.42), Commodity::new("$")),
        );
        assert_eq!(record.to_string(), "P 2016-02-07 \"MUTF2351\" 5.42 $");
    }

    #[test]
    fn test_natural_ordering() {
        let usd = || Commodity::new("USD");
        let mut records = vec![
            PriceRecord::new(date(2024, 1, 2), "AAPL".into(), Amount::new(dec!(1), usd())),
            PriceRecord::new(date(2024, 1, 1), "MSFT".into(), Amount::new(dec!(1), usd())),
            PriceRecord::new(date(2024, 1, 1), "AAPL".into(), Amount::new(dec!(2), usd())),
            PriceRecord::new(date(2024, 1, 1), "AAPL".into(), Amount::new(dec!(1), usd())),
        ];
        records.sort();

        let rendered: Vec<String> = records.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "P 2024-01-01 AAPL 1 USD",
                "P 2024-01-01 AAPL 2 USD",
                "P 2024-01-01 MSFT 1 USD",
                "P 2024-01-02 AAPL 1 USD",
            ]
        );
    }

    #[test]
    fn test_key_ignores_value() {
        let a = PriceRecord::new(date(2024, 1, 1), "AAPL".into(), Amount::bare(dec!(1)));
        let b = PriceRecord::new(date(2024, 1, 1), "AAPL".into(), Amount::bare(dec!(2)));
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
    }
}
