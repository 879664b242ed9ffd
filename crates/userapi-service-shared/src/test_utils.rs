//! Helpers for handler and responder tests.
//!
//! Enable the `test-utils` feature to use these from other crates.

use std::io;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::Environment;
use crate::state::AppState;

/// Fresh state over an empty in-memory store, version `1.0.0`.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(userapi_lib::MemoryUserStore::new()),
        Environment::Development,
        "1.0.0",
    )
}

/// A unique request id for tests that set `X-Request-ID`.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}

/// Split a response into its status and parsed JSON body.
///
/// # Panics
///
/// Panics if the body cannot be read or is not JSON.
pub async fn response_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("failed to read response body: {e}"));
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {bytes:?}"));
    (status, body)
}

/// In-memory sink for formatted log lines.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captures every event on the current thread until dropped.
///
/// Use from `#[tokio::test]` (current-thread runtime) so handler logs land
/// in the buffer.
pub struct LogCapture {
    buffer: LogBuffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        Self {
            buffer,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn contents(&self) -> String {
        self.buffer.contents()
    }
}

/// Run `f` with logging captured, returning its result and the log text.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = LogCapture::start();
    let out = f();
    (out, capture.contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_logs_records_events() {
        let ((), logs) = capture_logs(|| tracing::warn!(user_id = 7, "something odd"));
        assert!(logs.contains("something odd"));
        assert!(logs.contains("user_id=7"));
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
