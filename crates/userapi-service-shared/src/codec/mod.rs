//! JSON request decoding and response encoding.
//!
//! Requests are decoded against an explicit [`Schema`] so every failure can
//! be reported to the client in terms of the body it sent. Responses are
//! always a single-key [`Envelope`].

mod decode;
mod encode;
mod schema;

pub use decode::{decode, DecodeError, Decoder, StrictJson, MAX_BODY_BYTES};
pub use encode::{write_json, write_json_body, EncodeError, Envelope};
pub use schema::{Field, FieldKind, HasSchema, Schema};
