//! Updater error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StocksError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] phtoolz_core::LedgerError),

    #[error("Quote error: {0}")]
    Quote(#[from] phtoolz_quotes::QuoteError),
}

pub type StocksResult<T> = Result<T, StocksError>;
