//! Stock price update planning.
//!
//! The query window starts at the first stock transaction and ends the
//! day after the later of the latest transaction and today. Closes older
//! than `dense_window_days` before the window end are thinned out to one
//! point per `sparse_stride` per commodity. Recent closes are all kept.

use crate::config::{PriceFloor, UpdaterConfig};
use crate::error::StocksResult;
use chrono::{Duration, NaiveDate};
use phtoolz_core::{append_prices, Commodity, Ledger, PriceRecord, Transaction};
use phtoolz_quotes::{CommodityClassifier, PriceSource};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Date range `[start, end)` prices are requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryWindow {
    /// First day of the dense part of the window.
    pub fn dense_start(&self, dense_window_days: u32) -> NaiveDate {
        self.end - Duration::days(i64::from(dense_window_days))
    }
}

/// Outcome of one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Stock commodities found in the ledger.
    pub stocks: BTreeSet<Commodity>,
    /// `None` when the ledger has no stock transactions.
    pub window: Option<QueryWindow>,
    /// Prices the ledger was missing, sorted by date then commodity.
    pub new_prices: Vec<PriceRecord>,
}

/// Plans the prices to add to a ledger.
pub struct PriceUpdater<'a, C: ?Sized, S: ?Sized> {
    classifier: &'a C,
    source: &'a S,
    config: UpdaterConfig,
}

impl<'a, C, S> PriceUpdater<'a, C, S>
where
    C: CommodityClassifier + ?Sized,
    S: PriceSource + ?Sized,
{
    pub fn new(classifier: &'a C, source: &'a S, config: UpdaterConfig) -> Self {
        Self {
            classifier,
            source,
            config,
        }
    }

    /// Compute the prices missing from `ledger` as of `today`.
    pub fn plan(&self, ledger: &Ledger, today: NaiveDate) -> StocksResult<UpdateReport> {
        let transactions = ledger.transactions();
        let stocks = stock_commodities(transactions, self.classifier)?;

        let Some(window) = query_window(transactions, &stocks, today) else {
            info!("No stock transactions, nothing to update");
            return Ok(UpdateReport {
                stocks,
                window: None,
                new_prices: Vec::new(),
            });
        };

        info!(
            stocks = stocks.len(),
            start = %window.start,
            end = %window.end,
            "Getting stock prices"
        );

        let dense_start = window.dense_start(self.config.dense_window_days);
        let sparse_end = dense_start + Duration::days(1);

        let sparse = if window.start < sparse_end {
            let quotes = self.source.closing_prices(&stocks, window.start, sparse_end)?;
            sample_sparse(quotes, self.config.sparse_stride)
        } else {
            Vec::new()
        };
        let dense = self.source.closing_prices(&stocks, dense_start, window.end)?;

        debug!(
            sparse = sparse.len(),
            dense = dense.len(),
            "Fetched candidate prices"
        );

        let floors = price_floors(transactions, self.config.price_floor);
        let new_prices = select_new_prices(sparse, dense, ledger.prices(), &floors);

        Ok(UpdateReport {
            stocks,
            window: Some(window),
            new_prices,
        })
    }
}

/// Read `input` (or start from an empty ledger), plan the update, and
/// append the new prices to `output`.
///
/// `output` is not touched when there is nothing to add.
pub fn update_ledger<C, S>(
    input: Option<&Path>,
    output: &Path,
    classifier: &C,
    source: &S,
    config: &UpdaterConfig,
    today: NaiveDate,
) -> StocksResult<UpdateReport>
where
    C: CommodityClassifier + ?Sized,
    S: PriceSource + ?Sized,
{
    let ledger = match input {
        Some(path) => Ledger::from_path(path)?,
        None => Ledger::empty(),
    };

    let report = PriceUpdater::new(classifier, source, *config).plan(&ledger, today)?;
    let written = append_prices(output, &report.new_prices)?;

    info!(
        path = %output.display(),
        written,
        "Ledger update complete"
    );

    Ok(report)
}

/// Distinct transaction commodities the classifier calls stocks.
pub fn stock_commodities<C>(
    transactions: &[Transaction],
    classifier: &C,
) -> StocksResult<BTreeSet<Commodity>>
where
    C: CommodityClassifier + ?Sized,
{
    let distinct: BTreeSet<&Commodity> = transactions.iter().map(|tx| &tx.commodity).collect();

    let mut stocks = BTreeSet::new();
    for commodity in distinct {
        let kind = classifier.classify(commodity)?;
        debug!(commodity = %commodity, kind = %kind, "Classified commodity");
        if kind.is_stock() {
            stocks.insert(commodity.clone());
        }
    }
    Ok(stocks)
}

/// Window covering every stock transaction up to and including today.
pub fn query_window(
    transactions: &[Transaction],
    stocks: &BTreeSet<Commodity>,
    today: NaiveDate,
) -> Option<QueryWindow> {
    let start = transactions
        .iter()
        .filter(|tx| stocks.contains(&tx.commodity))
        .map(|tx| tx.date)
        .min()?;

    let latest = transactions
        .iter()
        .map(|tx| tx.date)
        .max()
        .unwrap_or(start);

    Some(QueryWindow {
        start,
        end: latest.max(today) + Duration::days(1),
    })
}

/// Earliest date a new price may carry, per commodity.
pub fn price_floors(transactions: &[Transaction], floor: PriceFloor) -> HashMap<Commodity, NaiveDate> {
    let mut floors: HashMap<Commodity, NaiveDate> = HashMap::new();
    for tx in transactions {
        floors
            .entry(tx.commodity.clone())
            .and_modify(|date| {
                *date = match floor {
                    PriceFloor::LatestTransaction => (*date).max(tx.date),
                    PriceFloor::FirstTransaction => (*date).min(tx.date),
                }
            })
            .or_insert(tx.date);
    }
    floors
}

/// Keep every `stride`-th close of each commodity, starting with its first.
pub fn sample_sparse(quotes: Vec<PriceRecord>, stride: usize) -> Vec<PriceRecord> {
    let mut by_commodity: BTreeMap<Commodity, Vec<PriceRecord>> = BTreeMap::new();
    for quote in quotes {
        by_commodity.entry(quote.commodity.clone()).or_default().push(quote);
    }

    by_commodity
        .into_values()
        .flat_map(|mut series| {
            series.sort_by_key(|quote| quote.date);
            series.into_iter().step_by(stride.max(1))
        })
        .collect()
}

/// Merge candidates, keeping the first close per (date, commodity).
///
/// Closes the ledger already has are dropped, as are closes dated before
/// their commodity's floor.
pub fn select_new_prices(
    sparse: Vec<PriceRecord>,
    dense: Vec<PriceRecord>,
    known: &[PriceRecord],
    floors: &HashMap<Commodity, NaiveDate>,
) -> Vec<PriceRecord> {
    let known: HashSet<(NaiveDate, &Commodity)> = known.iter().map(PriceRecord::key).collect();

    let mut candidates: BTreeMap<(NaiveDate, Commodity), PriceRecord> = BTreeMap::new();
    for record in sparse.into_iter().chain(dense) {
        candidates
            .entry((record.date, record.commodity.clone()))
            .or_insert(record);
    }

    candidates
        .into_values()
        .filter(|record| !known.contains(&record.key()))
        .filter(|record| {
            floors
                .get(&record.commodity)
                .is_some_and(|floor| record.date >= *floor)
        })
        .collect()
}
