//! Stock price updater for plain-text ledgers.
//!
//! Reads a ledger, finds the stock commodities, fetches their closing
//! prices for the period the ledger covers, and appends the prices the
//! ledger does not have yet:
//! - recent closes are kept daily, older ones sparsely
//! - closes dated before a commodity's price floor are dropped

pub mod config;
pub mod error;
pub mod updater;

pub use config::{PriceFloor, StocksConfig, UpdaterConfig};
pub use error::{StocksError, StocksResult};
pub use updater::{update_ledger, PriceUpdater, QueryWindow, UpdateReport};
