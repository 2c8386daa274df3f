//! Push-gateway client.
//!
//! Samples are rendered into the buffer at `push` time and sent in one
//! request on `flush`. All requests are blocking and never retried.

use crate::error::{TelemetryError, TelemetryResult};
use crate::exposition::{render_payload, render_sample, render_series};
use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Buffers rendered samples for a push-gateway at `url`.
pub struct MetricsClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    url: String,
    /// Rendered lines, in push order.
    buffer: Vec<String>,
}

impl MetricsClient {
    /// Create a client for the push-gateway at `url`.
    pub fn new(url: impl Into<String>) -> TelemetryResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TelemetryError::Http(format!("Failed to create HTTP client: {e}")))?;

        let url = url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            url,
            buffer: Vec::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered lines, in the order they will be sent.
    pub fn lines(&self) -> &[String] {
        &self.buffer
    }

    /// Payload the next `flush` would send.
    pub fn payload(&self) -> String {
        render_payload(&self.buffer)
    }

    /// Delete all series whose name matches the regex `pattern`.
    pub fn delete(&self, pattern: &str) -> TelemetryResult<()> {
        let selector = format!("{{__name__=~\"{pattern}\"}}");
        let url = format!("{}/delete", self.url);

        debug!(url = %url, selector = %selector, "Deleting series");

        let response = self
            .client
            .post(&url)
            .form(&[("match[]", selector.as_str())])
            .send()
            .map_err(|e| TelemetryError::Http(format!("HTTP request failed: {e}")))?;
        ensure_success(response)?;

        info!(pattern = %pattern, url = %self.url, "Deleted metrics");
        Ok(())
    }

    /// Buffer `samples` for the series `name` with `labels`.
    ///
    /// Labels render in the given order. Samples render in ascending date
    /// order; for a repeated date the last value wins. Values are rounded to
    /// two decimals here, so the buffer only ever holds final lines.
    /// Returns the number of lines buffered.
    pub fn push<K, V, I>(&mut self, name: &str, labels: &[(K, V)], samples: I) -> TelemetryResult<usize>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (NaiveDate, Decimal)>,
    {
        let series = render_series(name, labels)?;
        let samples: BTreeMap<NaiveDate, Decimal> = samples.into_iter().collect();

        self.buffer.extend(
            samples
                .iter()
                .map(|(date, value)| render_sample(&series, *date, *value)),
        );

        info!(series = %series, samples = samples.len(), "Pushed timeseries");
        Ok(samples.len())
    }

    /// Send the buffer to `{url}/import` and clear it.
    ///
    /// On any failure the buffer is left untouched so the same payload can
    /// be sent again. Returns the number of lines flushed.
    pub fn flush(&mut self) -> TelemetryResult<usize> {
        let url = format!("{}/import", self.url);
        let payload = self.payload();

        let response = self
            .client
            .post(&url)
            .body(payload)
            .send()
            .map_err(|e| TelemetryError::Http(format!("HTTP request failed: {e}")))?;
        ensure_success(response)?;

        let flushed = self.buffer.len();
        self.buffer.clear();

        info!(lines = flushed, url = %self.url, "Flushed metrics");
        Ok(flushed)
    }
}

fn ensure_success(response: Response) -> TelemetryResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(TelemetryError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::local_midnight_timestamp;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client() -> MetricsClient {
        MetricsClient::new("http://127.0.0.1:9/").unwrap()
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        assert_eq!(client().url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_push_sorts_samples_by_date() {
        let mut client = client();
        let pushed = client
            .push(
                "stock_value",
                &[("symbol", "AAPL")],
                vec![
                    (date(2024, 1, 3), dec!(3)),
                    (date(2024, 1, 1), dec!(1)),
                    (date(2024, 1, 2), dec!(2)),
                ],
            )
            .unwrap();

        assert_eq!(pushed, 3);
        let expected: Vec<String> = [(1, "1"), (2, "2"), (3, "3")]
            .iter()
            .map(|(day, value)| {
                format!(
                    r#"stock_value{{symbol="AAPL"}} {value} {}"#,
                    local_midnight_timestamp(date(2024, 1, *day))
                )
            })
            .collect();
        assert_eq!(client.lines(), expected.as_slice());
    }

    #[test]
    fn test_push_groups_keep_push_order() {
        let mut client = client();
        client
            .push("b", &[("k", "v")], vec![(date(2024, 1, 2), dec!(1))])
            .unwrap();
        client
            .push("a", &[("k", "v")], vec![(date(2024, 1, 1), dec!(1))])
            .unwrap();

        assert!(client.lines()[0].starts_with("b{"));
        assert!(client.lines()[1].starts_with("a{"));
    }

    #[test]
    fn test_push_rounds_at_buffer_time() {
        let mut client = client();
        client
            .push("price", &[("symbol", "MSFT")], vec![(date(2024, 5, 1), dec!(370.456))])
            .unwrap();

        assert!(client.lines()[0].contains(" 370.46 "));
    }

    #[test]
    fn test_push_repeated_date_keeps_last_value() {
        let mut client = client();
        let pushed = client
            .push(
                "price",
                &[("symbol", "MSFT")],
                vec![(date(2024, 5, 1), dec!(1)), (date(2024, 5, 1), dec!(2))],
            )
            .unwrap();

        assert_eq!(pushed, 1);
        assert!(client.lines()[0].contains(" 2 "));
    }

    #[test]
    fn test_invalid_series_buffers_nothing() {
        let mut client = client();
        let result = client.push("bad name", &[("k", "v")], vec![(date(2024, 1, 1), dec!(1))]);

        assert!(matches!(result, Err(TelemetryError::InvalidSeries(_))));
        assert!(client.is_empty());
    }

    #[test]
    fn test_empty_payload_is_eof_marker() {
        assert_eq!(client().payload(), "# EOF\n");
    }
}
