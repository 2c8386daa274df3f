//! Commodity symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger commodity symbol (e.g. "AAPL", "$", "VWRL.L").
///
/// Stored unquoted. `Display` renders ledger syntax, quoting the symbol
/// whenever ledger would otherwise misread it as part of a quantity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commodity(String);

impl Commodity {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Unquoted symbol.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the symbol must be wrapped in double quotes in a ledger file.
    pub fn needs_quotes(&self) -> bool {
        !self.0.chars().all(is_bare_symbol_char)
    }
}

fn is_bare_symbol_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '$' | '€' | '£' | '¥' | '₹' | '_')
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_quotes() {
            write!(f, "\"{}\"", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Commodity {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// External classification of a commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommodityKind {
    /// Listed equity or exchange traded fund.
    Stock,
    /// Mutual fund.
    Fund,
    Currency,
    Crypto,
    /// Known to the source but none of the above.
    Other,
    /// Not known to the source.
    Unknown,
}

impl CommodityKind {
    #[inline]
    pub fn is_stock(&self) -> bool {
        *self == Self::Stock
    }
}

impl fmt::Display for CommodityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stock => "stock",
            Self::Fund => "fund",
            Self::Currency => "currency",
            Self::Crypto => "crypto",
            Self::Other => "other",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_symbols_render_unquoted() {
        assert_eq!(Commodity::new("AAPL").to_string(), "AAPL");
        assert_eq!(Commodity::new("$").to_string(), "$");
        assert_eq!(Commodity::new("EUR").to_string(), "EUR");
    }

    #[test]
    fn test_symbols_with_digits_or_punctuation_are_quoted() {
        assert_eq!(Commodity::new("MUTF2351").to_string(), "\"MUTF2351\"");
        assert_eq!(Commodity::new("VWRL.L").to_string(), "\"VWRL.L\"");
        assert_eq!(Commodity::new("BRK-B").to_string(), "\"BRK-B\"");
    }

    #[test]
    fn test_ordering_is_by_symbol() {
        let mut symbols = vec![Commodity::new("MSFT"), Commodity::new("AAPL")];
        symbols.sort();
        assert_eq!(symbols[0].as_str(), "AAPL");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CommodityKind::Stock.to_string(), "stock");
        assert!(CommodityKind::Stock.is_stock());
        assert!(!CommodityKind::Fund.is_stock());
    }
}
