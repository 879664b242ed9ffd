//! Shared HTTP infrastructure for the user API services.
//!
//! This crate is the glue between axum and `userapi-lib`:
//!
//! - [`codec`]: strict JSON request decoding and single-key response envelopes
//! - [`query`]: typed, defaulting reads from the query string
//! - [`ApiError`]: every failure mapped to a status and `{"error": ...}` body
//! - [`logging`]: tracing subscriber setup
//! - [`middleware`]: request-id propagation and per-request spans
//! - [`AppState`], [`ServiceConfig`] and the healthcheck handler
//!
//! Handlers stay thin: decode, validate, call the store, encode.
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides state fixtures, response parsing and
//! log capture. Enable the `test-utils` feature to access it from dependent
//! crates.

#![deny(warnings)]

pub mod codec;
pub mod config;
pub mod error;
mod health;
pub mod logging;
pub mod middleware;
pub mod query;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use codec::{
    decode, write_json, write_json_body, DecodeError, Decoder, EncodeError, Envelope, Field,
    FieldKind, HasSchema, Schema, StrictJson, MAX_BODY_BYTES,
};
pub use config::{ConfigError, Environment, ServiceConfig};
pub use error::{ApiError, ErrorBody};
pub use health::{healthcheck, HealthStatus, SystemInfo};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use middleware::{extract_or_generate_request_id, RequestId, RequestTraceLayer};
pub use query::{read_csv, read_id_param, read_int, read_string, InvalidIdParam, QueryValues};
pub use state::AppState;
