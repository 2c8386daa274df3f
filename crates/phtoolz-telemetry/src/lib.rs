//! Prometheus push-gateway client and structured logging for phtoolz.
//!
//! - `MetricsClient`: buffers dated samples per labeled series and pushes
//!   them in text exposition format to a push-gateway `/import` route
//! - `with_client` / `ScopedClient`: acquire a client with a guaranteed
//!   final flush
//! - `init_logging`: tracing subscriber setup shared by the binaries

pub mod client;
pub mod error;
pub mod exposition;
pub mod logging;
pub mod scope;

pub use client::MetricsClient;
pub use error::{TelemetryError, TelemetryResult};
pub use exposition::EOF_MARKER;
pub use logging::init_logging;
pub use scope::{with_client, ScopedClient};
