//! Text exposition rendering for pushed samples.
//!
//! Line format: `name{k1="v1",k2="v2"} value unix_seconds`.
//! A payload is every line newline-terminated, followed by [`EOF_MARKER`].

use crate::error::{TelemetryError, TelemetryResult};
use chrono::{Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use prometheus::core::Desc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Final line of every import payload.
pub const EOF_MARKER: &str = "# EOF";

/// Decimal places kept for pushed values.
pub const VALUE_DECIMALS: u32 = 2;

/// Render the `name{labels}` selector of a series.
///
/// Labels keep the caller's order. The name and label names must satisfy
/// Prometheus naming rules and label names must be unique.
pub fn render_series<K, V>(name: &str, labels: &[(K, V)]) -> TelemetryResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut seen = HashSet::with_capacity(labels.len());
    for (key, _) in labels {
        if !seen.insert(key.as_ref()) {
            return Err(TelemetryError::InvalidSeries(format!(
                "duplicate label '{}' on {name}",
                key.as_ref()
            )));
        }
    }

    let label_names = labels.iter().map(|(k, _)| k.as_ref().to_string()).collect();
    Desc::new(name.to_string(), name.to_string(), label_names, HashMap::new())
        .map_err(|e| TelemetryError::InvalidSeries(e.to_string()))?;

    let rendered: Vec<String> = labels
        .iter()
        .map(|(key, value)| {
            format!(
                "{}=\"{}\"",
                key.as_ref(),
                escape_label_value(value.as_ref())
            )
        })
        .collect();

    Ok(format!("{name}{{{}}}", rendered.join(",")))
}

/// Escape backslash, double quote and newline in a label value.
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Round to [`VALUE_DECIMALS`] (banker's rounding) without trailing zeros.
#[inline]
pub fn round_value(value: Decimal) -> Decimal {
    value.round_dp(VALUE_DECIMALS).normalize()
}

/// Unix seconds of local midnight on `date`.
///
/// When midnight is skipped by a DST transition, the first valid local
/// instant of the day is used.
pub fn local_midnight_timestamp(date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(chrono::Local) {
        LocalResult::Single(t) => t.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => (1..=96)
            .find_map(|quarter| {
                (midnight + Duration::minutes(15 * quarter))
                    .and_local_timezone(chrono::Local)
                    .earliest()
            })
            .map(|t| t.timestamp())
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight).timestamp()),
    }
}

/// Render one sample line for an already rendered series selector.
pub fn render_sample(series: &str, date: NaiveDate, value: Decimal) -> String {
    format!(
        "{series} {} {}",
        round_value(value),
        local_midnight_timestamp(date)
    )
}

/// Join buffered lines into an import payload.
pub fn render_payload(lines: &[String]) -> String {
    let capacity = lines.iter().map(|l| l.len() + 1).sum::<usize>() + EOF_MARKER.len() + 1;
    let mut payload = String::with_capacity(capacity);
    for line in lines {
        payload.push_str(line);
        payload.push('\n');
    }
    payload.push_str(EOF_MARKER);
    payload.push('\n');
    payload
}
