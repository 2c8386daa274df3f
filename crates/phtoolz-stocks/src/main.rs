//! phtoolz-stocks - Entry Point
//!
//! Appends missing stock closing prices to a ledger file.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use phtoolz_quotes::YahooFinance;
use phtoolz_stocks::{update_ledger, StocksConfig};
use std::path::PathBuf;
use tracing::info;

/// Updates stock prices in a ledger file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Ledger file to read; without it the ledger is treated as empty
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Ledger file new prices are appended to
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    phtoolz_telemetry::init_logging()?;

    info!("Starting phtoolz-stocks v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = StocksConfig::load()?;
    info!(?config.updater, base_url = %config.quotes.base_url, "Configuration loaded");

    // Create quote client
    let yahoo = YahooFinance::new(&config.quotes)?;
    let today = Local::now().date_naive();

    // Update ledger
    let report = update_ledger(
        args.input.as_deref(),
        &args.output,
        &yahoo,
        &yahoo,
        &config.updater,
        today,
    )?;

    // Report
    match report.window {
        Some(window) => println!(
            "found {} stocks, prices from {} to {}",
            report.stocks.len(),
            window.start,
            window.end
        ),
        None => println!("found 0 stocks, nothing to do"),
    }
    println!(
        "wrote {} new prices to {}",
        report.new_prices.len(),
        args.output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_required() {
        assert!(Args::try_parse_from(["phtoolz-stocks"]).is_err());
        assert!(Args::try_parse_from(["phtoolz-stocks", "-i", "main.ledger"]).is_err());
    }

    #[test]
    fn test_input_is_optional() {
        let args = Args::try_parse_from(["phtoolz-stocks", "-o", "prices.ledger"]).unwrap();
        assert_eq!(args.input, None);
        assert_eq!(args.output, PathBuf::from("prices.ledger"));

        let args =
            Args::try_parse_from(["phtoolz-stocks", "--input", "a.ledger", "--output", "b.ledger"])
                .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("a.ledger")));
        assert_eq!(args.output, PathBuf::from("b.ledger"));
    }
}
