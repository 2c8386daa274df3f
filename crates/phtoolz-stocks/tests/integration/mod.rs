//! Integration tests for phtoolz-stocks.
//!
//! These tests run the updater end to end against ledger files on disk.

pub mod common;
