//! Scoped client acquisition with a guaranteed final flush.

use crate::client::MetricsClient;
use crate::error::{TelemetryError, TelemetryResult};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Owns a [`MetricsClient`] and flushes it exactly once.
///
/// `close` flushes and reports the result. A guard dropped without
/// `close` (early return, panic unwinding) flushes in `drop` and can only
/// log a failure.
pub struct ScopedClient {
    client: MetricsClient,
    closed: bool,
}

impl ScopedClient {
    pub fn new(client: MetricsClient) -> Self {
        Self {
            client,
            closed: false,
        }
    }

    /// Flush the buffer and release the client.
    pub fn close(mut self) -> TelemetryResult<usize> {
        self.closed = true;
        self.client.flush()
    }
}

impl Deref for ScopedClient {
    type Target = MetricsClient;

    fn deref(&self) -> &MetricsClient {
        &self.client
    }
}

impl DerefMut for ScopedClient {
    fn deref_mut(&mut self) -> &mut MetricsClient {
        &mut self.client
    }
}

impl Drop for ScopedClient {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.client.flush() {
            warn!(error = %e, url = %self.client.url(), "Failed to flush metrics on drop");
        }
    }
}

/// Run `body` with a client for `url`, then flush whatever it buffered.
///
/// The flush runs whether `body` succeeds or fails. When `body` fails its
/// error is returned and a flush failure is only logged; when it succeeds
/// a flush failure is returned.
pub fn with_client<T, E, F>(url: impl Into<String>, body: F) -> Result<T, E>
where
    F: FnOnce(&mut MetricsClient) -> Result<T, E>,
    E: From<TelemetryError>,
{
    let mut scoped = ScopedClient::new(MetricsClient::new(url)?);
    let outcome = body(&mut *scoped);
    let flushed = scoped.close();

    match outcome {
        Ok(value) => {
            flushed?;
            Ok(value)
        }
        Err(err) => {
            if let Err(flush_err) = flushed {
                warn!(error = %flush_err, "Final flush failed after scope error");
            }
            Err(err)
        }
    }
}
