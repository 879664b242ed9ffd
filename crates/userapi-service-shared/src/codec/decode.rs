use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_LENGTH;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::{Map, Value};
use thiserror::Error;

use super::schema::{Field, FieldKind, HasSchema, Schema};
use crate::error::ApiError;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Why a request body could not be decoded.
///
/// Every variant except [`DecodeError::Internal`] describes a problem with
/// the client's input and its `Display` text is safe to send back.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("the body must not be empty")]
    Empty,

    /// `offset` is the 1-based byte position of the offending byte.
    #[error("the body contains badly-formed JSON (at character {offset})")]
    Syntax { offset: usize },

    #[error("the body contains badly-formed JSON")]
    UnexpectedEof,

    #[error("body must only contain a single JSON value")]
    MultipleValues,

    #[error("the body contains unknown key \"{0}\"")]
    UnknownKey(String),

    /// `field` is a dotted path for nested objects.
    #[error("the body contains incorrect JSON type for field \"{field}\"")]
    FieldType { field: String },

    #[error("the body contains incorrect JSON type (at character {offset})")]
    Type { offset: usize },

    /// The checked value still failed to convert into the target type.
    #[error("failed to convert request body: {0}")]
    Internal(#[source] serde_json::Error),
}

impl DecodeError {
    /// Whether the client is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DecodeError::Internal(_))
    }
}

/// Strict JSON decoder with a body size limit.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    max_bytes: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            max_bytes: MAX_BODY_BYTES,
        }
    }
}

impl Decoder {
    pub fn with_limit(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Decode exactly one JSON object matching `schema` into `T`.
    pub fn decode<T: DeserializeOwned>(&self, body: &[u8], schema: &Schema) -> Result<T, DecodeError> {
        if body.len() > self.max_bytes {
            return Err(DecodeError::TooLarge {
                limit: self.max_bytes,
            });
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Empty);
        }

        let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
        let value = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Err(classify_syntax(body, &e)),
            None => return Err(DecodeError::Empty),
        };
        if stream.next().is_some() {
            return Err(DecodeError::MultipleValues);
        }

        let Value::Object(map) = value else {
            return Err(DecodeError::Type {
                offset: first_value_offset(body),
            });
        };
        check_object(&map, schema, "")?;

        serde_json::from_value(Value::Object(map)).map_err(DecodeError::Internal)
    }
}

/// Decode `body` against `T`'s own schema with the default limit.
pub fn decode<T: HasSchema + DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    Decoder::default().decode(body, &T::schema())
}

fn classify_syntax(body: &[u8], err: &serde_json::Error) -> DecodeError {
    match err.classify() {
        Category::Eof => DecodeError::UnexpectedEof,
        _ => DecodeError::Syntax {
            offset: byte_offset(body, err.line(), err.column()),
        },
    }
}

/// Convert serde_json's 1-based line and byte column into a 1-based offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start = body
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .nth(line.saturating_sub(2))
        .filter(|_| line > 1)
        .map_or(0, |(i, _)| i + 1);
    line_start + column
}

fn first_value_offset(body: &[u8]) -> usize {
    body.iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(1, |i| i + 1)
}

fn check_object(map: &Map<String, Value>, schema: &Schema, prefix: &str) -> Result<(), DecodeError> {
    for (key, value) in map {
        let Some(field) = schema.field(key) else {
            return Err(DecodeError::UnknownKey(join(prefix, key)));
        };
        check_value(value, field, &join(prefix, field.name))?;
    }
    Ok(())
}

fn check_value(value: &Value, field: &Field, path: &str) -> Result<(), DecodeError> {
    if value.is_null() {
        return if field.nullable || field.kind == FieldKind::Any {
            Ok(())
        } else {
            Err(mismatch(path))
        };
    }
    check_kind(value, &field.kind, path)
}

fn check_kind(value: &Value, kind: &FieldKind, path: &str) -> Result<(), DecodeError> {
    let ok = match (kind, value) {
        (FieldKind::Any, _) => true,
        (FieldKind::String, Value::String(_)) => true,
        (FieldKind::Integer, Value::Number(n)) => n.is_i64(),
        (FieldKind::Number, Value::Number(_)) => true,
        (FieldKind::Boolean, Value::Bool(_)) => true,
        (FieldKind::Object(schema), Value::Object(map)) => {
            return check_object(map, schema, path);
        }
        (FieldKind::Array(element), Value::Array(items)) => {
            for item in items {
                check_kind(item, element, path)?;
            }
            true
        }
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(mismatch(path))
    }
}

fn mismatch(path: &str) -> DecodeError {
    DecodeError::FieldType {
        field: path.to_string(),
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Axum extractor that buffers the body and decodes it with [`decode`].
///
/// Rejections are [`ApiError`]s, so a handler taking `StrictJson<T>` never
/// sees malformed input.
#[derive(Debug, Clone)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: HasSchema + DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let too_large = DecodeError::TooLarge {
            limit: MAX_BODY_BYTES,
        };

        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
            return Err(too_large.into());
        }

        // to_bytes only fails on the length limit or a dropped connection.
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES + 1)
            .await
            .map_err(|_| ApiError::from(too_large))?;

        decode::<T>(&bytes).map(StrictJson).map_err(ApiError::from)
    }
}
