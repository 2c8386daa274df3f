//! Yahoo Finance v8 chart API client.
//!
//! One endpoint serves both needs:
//! - `meta.instrumentType` classifies a symbol
//! - `timestamp` + `indicators.quote[0].close` give daily closes
//!
//! Ledger commodity symbols are used as Yahoo tickers verbatim.

use crate::config::QuotesConfig;
use crate::error::{QuoteError, QuoteResult};
use crate::source::{CommodityClassifier, PriceSource};
use chrono::{DateTime, NaiveDate, NaiveTime};
use phtoolz_core::{Amount, Commodity, CommodityKind, PriceRecord};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Currency codes classified without asking the API.
const CURRENCY_CODES: &[&str] = &[
    "AUD", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF", "ILS", "INR",
    "JPY", "KRW", "MXN", "NOK", "NZD", "PLN", "RUB", "SEK", "SGD", "TRY", "USD", "ZAR",
];

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    instrument_type: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBars>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBars {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Client for the Yahoo Finance chart API.
pub struct YahooFinance {
    /// HTTP client.
    client: Client,
    /// API base URL.
    base_url: Url,
    /// Decimal places kept for closes.
    price_decimals: u32,
    /// Classification memo.
    kinds: RefCell<HashMap<Commodity, CommodityKind>>,
}

impl YahooFinance {
    /// Create a client from configuration.
    pub fn new(config: &QuotesConfig) -> QuoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| QuoteError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| QuoteError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(QuoteError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            price_decimals: config.price_decimals,
            kinds: RefCell::new(HashMap::new()),
        })
    }

    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url
    }

    /// Fetch the chart for `symbol`. `None` when the symbol is unknown.
    fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> QuoteResult<Option<ChartResult>> {
        let url = self.chart_url(symbol);
        debug!(url = %url, "Fetching chart");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| QuoteError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(QuoteError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| QuoteError::HttpClient(format!("Failed to read response: {e}")))?;
        decode_chart(symbol, &body)
    }
}

fn decode_chart(symbol: &str, body: &str) -> QuoteResult<Option<ChartResult>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(QuoteError::Api {
            symbol: symbol.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }

    Ok(response.chart.result.and_then(|results| results.into_iter().next()))
}

/// Map `meta.instrumentType` onto commodity kinds.
fn kind_from_instrument(instrument_type: Option<&str>) -> CommodityKind {
    match instrument_type {
        Some("EQUITY") | Some("ETF") => CommodityKind::Stock,
        Some("MUTUALFUND") => CommodityKind::Fund,
        Some("CURRENCY") => CommodityKind::Currency,
        Some("CRYPTOCURRENCY") => CommodityKind::Crypto,
        Some(_) => CommodityKind::Other,
        None => CommodityKind::Unknown,
    }
}

fn is_currency_symbol(symbol: &str) -> bool {
    !symbol.chars().any(char::is_alphanumeric) || CURRENCY_CODES.contains(&symbol)
}

/// Daily closes of `result` within `[from, to)`; a repeated date keeps the
/// last bar.
fn closes_in_range(
    commodity: &Commodity,
    result: &ChartResult,
    from: NaiveDate,
    to: NaiveDate,
    decimals: u32,
) -> Vec<PriceRecord> {
    let currency = result.meta.currency.as_deref().map(Commodity::new);
    let closes = result
        .indicators
        .quote
        .first()
        .map(|bars| bars.close.as_slice())
        .unwrap_or_default();

    let mut by_date = BTreeMap::new();
    for (timestamp, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(timestamp + result.meta.gmtoffset, 0)
            .map(|t| t.date_naive())
        else {
            continue;
        };
        if date < from || date >= to {
            continue;
        }
        if let Some(quantity) = Decimal::from_f64_retain(*close) {
            by_date.insert(date, quantity.round_dp(decimals));
        }
    }

    by_date
        .into_iter()
        .map(|(date, quantity)| {
            PriceRecord::new(
                date,
                commodity.clone(),
                Amount {
                    quantity,
                    commodity: currency.clone(),
                },
            )
        })
        .collect()
}

fn utc_seconds(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().timestamp().to_string()
}

impl CommodityClassifier for YahooFinance {
    fn classify(&self, commodity: &Commodity) -> QuoteResult<CommodityKind> {
        if let Some(kind) = self.kinds.borrow().get(commodity) {
            return Ok(*kind);
        }

        let symbol = commodity.as_str();
        let kind = if is_currency_symbol(symbol) {
            CommodityKind::Currency
        } else {
            let query = [("range", "5d".to_string()), ("interval", "1d".to_string())];
            match self.fetch_chart(symbol, &query)? {
                Some(result) => kind_from_instrument(result.meta.instrument_type.as_deref()),
                None => CommodityKind::Unknown,
            }
        };

        debug!(commodity = %symbol, %kind, "Classified commodity");
        self.kinds.borrow_mut().insert(commodity.clone(), kind);
        Ok(kind)
    }
}

impl PriceSource for YahooFinance {
    fn closing_prices(
        &self,
        commodities: &BTreeSet<Commodity>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> QuoteResult<Vec<PriceRecord>> {
        if from >= to {
            return Ok(Vec::new());
        }

        let mut prices = Vec::new();
        for commodity in commodities {
            let query = [
                ("period1", utc_seconds(from)),
                ("period2", utc_seconds(to)),
                ("interval", "1d".to_string()),
            ];

            let Some(result) = self.fetch_chart(commodity.as_str(), &query)? else {
                warn!(commodity = %commodity.as_str(), "No chart data");
                continue;
            };

            let closes = closes_in_range(commodity, &result, from, to, self.price_decimals);
            debug!(commodity = %commodity.as_str(), closes = closes.len(), "Fetched closes");
            prices.extend(closes);
        }

        info!(
            commodities = commodities.len(),
            %from,
            %to,
            prices = prices.len(),
            "Fetched closing prices"
        );
        Ok(prices)
    }
}
