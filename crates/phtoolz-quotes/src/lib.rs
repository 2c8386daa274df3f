//! Commodity classification and historical price sources for phtoolz.
//!
//! The updater only talks to the `CommodityClassifier` and `PriceSource`
//! traits; `YahooFinance` implements both over the v8 chart API.

pub mod config;
pub mod error;
pub mod source;
pub mod yahoo;

pub use config::QuotesConfig;
pub use error::{QuoteError, QuoteResult};
pub use source::{CommodityClassifier, PriceSource};
pub use yahoo::YahooFinance;
