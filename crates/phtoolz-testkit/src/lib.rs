//! Shared test helpers for phtoolz crates.
//!
//! - `MockHttpServer`: an axum server on an ephemeral port that replies
//!   with scripted statuses and records every request

pub mod mock_http;

pub use mock_http::{MockHttpServer, RecordedRequest};
