//! Quote source configuration.

use serde::{Deserialize, Serialize};

/// Settings for the Yahoo Finance chart client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotesConfig {
    /// API base URL. Default: "https://query1.finance.yahoo.com".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent sent with every request; the API rejects empty ones.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout (seconds). Default: 30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Decimal places kept for closing prices. Default: 2.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    format!("phtoolz/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_price_decimals() -> u32 {
    2
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            price_decimals: default_price_decimals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: QuotesConfig = toml::from_str("price_decimals = 4").unwrap();
        assert_eq!(config.price_decimals, 4);
        assert_eq!(config.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.timeout_secs, 30);
    }
}
