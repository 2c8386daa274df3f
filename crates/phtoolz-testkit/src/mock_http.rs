//! Mock HTTP server for integration tests.
//!
//! Provides an HTTP server that can:
//! - Accept connections on an ephemeral port
//! - Reply with scripted statuses and bodies (default `204`)
//! - Record received requests
//!
//! The server runs on its own thread with a current-thread runtime, so it
//! serves blocking clients called from plain `#[test]` functions.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

/// A request as received by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<(u16, String)>>,
}

/// A mock HTTP server for testing.
pub struct MockHttpServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MockHttpServer {
    /// Start a new mock server on an available port.
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(record).with_state(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the response for the next request.
    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        self.state.responses.lock().push_back((status, body.into()));
    }

    /// All requests received so far.
    pub fn received(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn record(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        path: uri.to_string(),
        headers,
        body,
    });

    let (status, body) = state
        .responses
        .lock()
        .pop_front()
        .unwrap_or((204, String::new()));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn raw_request(server: &MockHttpServer, request: &str) -> String {
        let mut stream = std::net::TcpStream::connect(server.addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_mock_server_starts() {
        let server = MockHttpServer::start();
        assert!(server.url().starts_with("http://127.0.0.1:"));
        assert!(server.received().is_empty());
    }

    #[test]
    fn test_scripted_response_and_recording() {
        let server = MockHttpServer::start();
        server.respond_with(503, "down");

        let response = raw_request(
            &server,
            "POST /import?x=1 HTTP/1.1\r\nHost: test\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        );
        assert!(response.starts_with("HTTP/1.1 503"));
        assert!(response.ends_with("down"));

        let requests = server.received();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/import?x=1");
        assert_eq!(requests[0].header("host"), Some("test"));
        assert_eq!(requests[0].body, "hello");
    }

    #[test]
    fn test_default_response_is_no_content() {
        let server = MockHttpServer::start();
        let response = raw_request(
            &server,
            "GET / HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
        );
        assert!(response.starts_with("HTTP/1.1 204"));
    }
}
