//! Ledger postings.

use crate::commodity::Commodity;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One posting of a ledger transaction that carries a commodity amount.
///
/// A transaction with several postings yields several of these, one per
/// posting, all sharing the header's date and payee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub payee: String,
    pub account: String,
    pub commodity: Commodity,
    pub quantity: Decimal,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        payee: impl Into<String>,
        account: impl Into<String>,
        commodity: Commodity,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            payee: payee.into(),
            account: account.into(),
            commodity,
            quantity,
        }
    }
}
