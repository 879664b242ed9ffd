use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failure to produce a response body.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build response: {0}")]
    Http(#[from] axum::http::Error),
}

/// Single-key JSON wrapper: `{"<key>": payload}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    key: &'static str,
    payload: T,
}

impl<T> Envelope<T> {
    pub fn new(key: &'static str, payload: T) -> Self {
        Self { key, payload }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.payload)?;
        map.end()
    }
}

/// Build a JSON response from `envelope`.
///
/// The envelope is serialized before anything else, so a serialization
/// failure leaves nothing written. `headers` are added after
/// `Content-Type: application/json`.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    envelope: &Envelope<T>,
    headers: HeaderMap,
) -> Result<Response, EncodeError> {
    write_json_body(status, envelope, headers)
}

/// Like [`write_json`] for payloads that are not wrapped in an [`Envelope`].
///
/// Only the healthcheck uses this; its body is a flat status object.
pub fn write_json_body<T: Serialize>(
    status: StatusCode,
    payload: &T,
    headers: HeaderMap,
) -> Result<Response, EncodeError> {
    let body = serde_json::to_vec(payload)?;

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(map) = builder.headers_mut() {
        map.extend(headers);
    }

    Ok(builder.body(Body::from(body))?)
}
