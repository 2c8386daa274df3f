//! Amounts as written in ledger postings and price directives.

use crate::commodity::Commodity;
use crate::error::{LedgerError, LedgerResult};
use crate::grammar::{self, RawAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal quantity with an optional commodity.
///
/// Ordered by quantity, then commodity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub quantity: Decimal,
    pub commodity: Option<Commodity>,
}

impl Amount {
    pub fn new(quantity: Decimal, commodity: Commodity) -> Self {
        Self {
            quantity,
            commodity: Some(commodity),
        }
    }

    /// Amount without a commodity.
    pub fn bare(quantity: Decimal) -> Self {
        Self {
            quantity,
            commodity: None,
        }
    }

    pub(crate) fn from_raw(raw: RawAmount) -> LedgerResult<Self> {
        let quantity = Decimal::from_str(&raw.quantity.replace(',', ""))
            .map_err(|e| LedgerError::InvalidAmount(format!("'{}': {e}", raw.quantity)))?;

        Ok(Self {
            quantity: if raw.negative { -quantity } else { quantity },
            commodity: raw.symbol.map(Commodity::new),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.commodity {
            Some(commodity) => write!(f, "{} {}", self.quantity, commodity),
            None => write!(f, "{}", self.quantity),
        }
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parse `10 AAPL`, `-5.82 USD`, `$1,000.50`, `-$5`, `$-5`, `"VWRL.L" 3` or `42`.
    fn from_str(s: &str) -> LedgerResult<Self> {
        grammar::parse_amount(s).and_then(Self::from_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_quantity_then_symbol() {
        let amount: Amount = "10 AAPL".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(10), Commodity::new("AAPL")));

        let amount: Amount = "-5.82 USD".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(-5.82), Commodity::new("USD")));
    }

    #[test]
    fn test_parse_symbol_then_quantity() {
        let amount: Amount = "$1,000.50".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(1000.50), Commodity::new("$")));

        let amount: Amount = "$-5.82".parse().unwrap();
        assert_eq!(amount.quantity, dec!(-5.82));

        let amount: Amount = "-$5".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(-5), Commodity::new("$")));
    }

    #[test]
    fn test_parse_quoted_symbols() {
        let amount: Amount = "\"VWRL.L\" 3".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(3), Commodity::new("VWRL.L")));

        let amount: Amount = "12.5 \"MUTF2351\"".parse().unwrap();
        assert_eq!(amount, Amount::new(dec!(12.5), Commodity::new("MUTF2351")));
    }

    #[test]
    fn test_parse_bare_quantity() {
        let amount: Amount = "42".parse().unwrap();
        assert_eq!(amount, Amount::bare(dec!(42)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Amount>().is_err());
        assert!("AAPL".parse::<Amount>().is_err());
        assert!("10 AAPL extra".parse::<Amount>().is_err());
        assert!("\"AAPL 10".parse::<Amount>().is_err());
        assert!(matches!(
            "1.2.3 USD".parse::<Amount>(),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!("AAPL".parse::<Amount>(), Err(LedgerError::Syntax(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Amount::new(dec!(185.12), Commodity::new("USD")).to_string(),
            "185.12 USD"
        );
        assert_eq!(
            Amount::new(dec!(5.42), Commodity::new("MUTF2351")).to_string(),
            "5.42 \"MUTF2351\""
        );
        assert_eq!(Amount::bare(dec!(7)).to_string(), "7");
    }
}
