//! Quote source error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("Quote API error for {symbol}: {message}")]
    Api { symbol: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type QuoteResult<T> = Result<T, QuoteError>;
