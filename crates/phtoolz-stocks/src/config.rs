//! Updater configuration.

use crate::error::{StocksError, StocksResult};
use phtoolz_quotes::QuotesConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which transaction date bounds a commodity's new prices from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFloor {
    /// Most recent transaction of the commodity.
    #[default]
    LatestTransaction,
    /// First transaction of the commodity.
    FirstTransaction,
}

/// Price selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Days before the window end in which every close is kept. Default: 90.
    #[serde(default = "default_dense_window_days")]
    pub dense_window_days: u32,
    /// Older closes keep one point in this many. Default: 30.
    #[serde(default = "default_sparse_stride")]
    pub sparse_stride: usize,
    #[serde(default)]
    pub price_floor: PriceFloor,
}

fn default_dense_window_days() -> u32 {
    90
}

fn default_sparse_stride() -> usize {
    30
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            dense_window_days: default_dense_window_days(),
            sparse_stride: default_sparse_stride(),
            price_floor: PriceFloor::default(),
        }
    }
}

/// Top-level configuration of `phtoolz-stocks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StocksConfig {
    #[serde(default)]
    pub updater: UpdaterConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
}

impl StocksConfig {
    /// Load configuration from `PHTOOLZ_CONFIG` or `config/stocks.toml`.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> StocksResult<Self> {
        let config_path =
            std::env::var("PHTOOLZ_CONFIG").unwrap_or_else(|_| "config/stocks.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::debug!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> StocksResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StocksError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> StocksResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| StocksError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StocksResult<()> {
        if self.updater.sparse_stride == 0 {
            return Err(StocksError::Config("updater.sparse_stride must be positive".to_string()));
        }
        if self.updater.dense_window_days == 0 {
            return Err(StocksError::Config(
                "updater.dense_window_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
