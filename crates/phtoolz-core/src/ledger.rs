//! Plain-text ledger reader and price appender.
//!
//! Understands the subset of ledger syntax the tools rely on:
//! - transaction headers (`2024-01-01 * Payee`) and their indented postings
//! - `P` price directives
//! - comments, blank lines, and other directives, which are skipped along
//!   with their indented bodies
//! - `comment` and `test` blocks, skipped up to their `end` line
//!
//! Existing lines are never rewritten; [`append_prices`] only appends.

use crate::amount::Amount;
use crate::commodity::Commodity;
use crate::error::{LedgerError, LedgerResult};
use crate::grammar::{self, Posting};
use crate::price::PriceRecord;
use crate::transaction::Transaction;
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Transactions and prices read from a ledger, in file order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    prices: Vec<PriceRecord>,
}

/// What indented lines currently belong to.
enum Block {
    None,
    Transaction { date: NaiveDate, payee: String },
    Skipped,
    Comment { closing: &'static str },
}

impl Ledger {
    /// Ledger with no transactions and no prices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read and parse a ledger file.
    pub fn from_path(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ledger = Self::parse(&text)?;

        info!(
            path = %path.display(),
            transactions = ledger.transactions.len(),
            prices = ledger.prices.len(),
            "Read ledger"
        );

        Ok(ledger)
    }

    /// Parse ledger text.
    pub fn parse(text: &str) -> LedgerResult<Self> {
        let mut ledger = Self::empty();
        let mut block = Block::None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim_end();

            if let Block::Comment { closing } = block {
                if line.trim_start() == closing {
                    block = Block::None;
                }
                continue;
            }

            let Some(first) = line.chars().next() else {
                block = Block::None;
                continue;
            };

            if first.is_whitespace() {
                if let Block::Transaction { date, payee } = &block {
                    if let Some(tx) = parse_posting(line.trim(), *date, payee)
                        .map_err(|e| at_line(line_no, e))?
                    {
                        ledger.transactions.push(tx);
                    }
                }
                continue;
            }

            block = Block::None;
            match first {
                ';' | '#' | '%' | '|' | '*' => {}
                'P' if line[1..].starts_with(char::is_whitespace) => {
                    let price = parse_price(line).map_err(|e| at_line(line_no, e))?;
                    ledger.prices.push(price);
                }
                c if c.is_ascii_digit() => {
                    let (date, payee) = parse_header(line).map_err(|e| at_line(line_no, e))?;
                    block = Block::Transaction { date, payee };
                }
                _ => {
                    block = match line.split_whitespace().next() {
                        Some("comment") => Block::Comment {
                            closing: "end comment",
                        },
                        Some("test") => Block::Comment { closing: "end test" },
                        _ => Block::Skipped,
                    };
                    debug!(line = line_no, "Skipping directive");
                }
            }
        }

        Ok(ledger)
    }

    /// All postings carrying a commodity amount, in file order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// All `P` directives, in file order.
    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }
}

/// Append `records` as `P` lines to the ledger at `path`.
///
/// Writes nothing (and does not touch the file) when `records` is empty.
/// Otherwise the block is preceded by a blank line and written with a
/// single `write_all`. Returns the number of lines appended.
pub fn append_prices(path: impl AsRef<Path>, records: &[PriceRecord]) -> LedgerResult<usize> {
    let path = path.as_ref();
    if records.is_empty() {
        debug!(path = %path.display(), "No price records to append");
        return Ok(0);
    }

    let mut payload = String::from("\n");
    for record in records {
        payload.push_str(&record.to_string());
        payload.push('\n');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(payload.as_bytes())?;
    file.flush()?;

    info!(path = %path.display(), records = records.len(), "Appended price records");

    Ok(records.len())
}

fn at_line(line: usize, err: LedgerError) -> LedgerError {
    match err {
        LedgerError::Parse { .. } | LedgerError::Io(_) => err,
        other => LedgerError::Parse {
            line,
            message: other.to_string(),
        },
    }
}

fn parse_date(token: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|e| LedgerError::InvalidDate(format!("'{token}': {e}")))
}

fn parse_header(line: &str) -> LedgerResult<(NaiveDate, String)> {
    let header = grammar::parse_header(line)?;
    Ok((parse_date(&header.date)?, header.payee))
}

fn parse_posting(text: &str, date: NaiveDate, payee: &str) -> LedgerResult<Option<Transaction>> {
    let Some(Posting {
        account,
        amount: Some(raw),
    }) = grammar::parse_posting(text)?
    else {
        return Ok(None);
    };

    let amount = Amount::from_raw(raw)?;
    Ok(amount.commodity.map(|commodity| {
        Transaction::new(date, payee, account, commodity, amount.quantity)
    }))
}

fn parse_price(line: &str) -> LedgerResult<PriceRecord> {
    let raw = grammar::parse_price(line)?;
    Ok(PriceRecord::new(
        parse_date(&raw.date)?,
        Commodity::new(raw.commodity),
        Amount::from_raw(raw.value)?,
    ))
}
