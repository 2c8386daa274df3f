//! Ledger domain types for phtoolz.
//!
//! This crate provides the plain-text ledger vocabulary shared by the tools:
//! - `Commodity`: a ledger commodity symbol with ledger quoting rules
//! - `Amount`: decimal quantity with an optional commodity
//! - `Transaction`: one posting carrying an amount
//! - `PriceRecord`: a `P` price directive
//! - `Ledger`: reader for ledger files and appender for price lines

pub mod amount;
pub mod commodity;
pub mod error;
mod grammar;
pub mod ledger;
pub mod price;
pub mod transaction;

pub use amount::Amount;
pub use commodity::{Commodity, CommodityKind};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{append_prices, Ledger};
pub use price::PriceRecord;
pub use transaction::Transaction;
