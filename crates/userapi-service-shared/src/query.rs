//! Typed reads from the request query string.
//!
//! The `read_*` helpers never fail the request: missing or empty values fall
//! back to the caller's default, and unparseable values are recorded on the
//! [`Validator`] so they surface together with every other input problem.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thiserror::Error;
use url::form_urlencoded;

use userapi_lib::Validator;

/// Decoded `application/x-www-form-urlencoded` query pairs, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    pairs: Vec<(String, String)>,
}

impl QueryValues {
    /// Decode a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `key`, if the key appears at all.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first value for `key` when it is present and non-empty.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryValues {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default()))
    }
}

pub fn read_string(qs: &QueryValues, key: &str, default: &str) -> String {
    qs.non_empty(key).unwrap_or(default).to_string()
}

/// Split the value for `key` on commas.
///
/// Returns `default` untouched when the key is missing or empty.
pub fn read_csv(qs: &QueryValues, key: &str, default: Vec<String>) -> Vec<String> {
    match qs.non_empty(key) {
        Some(csv) => csv.split(',').map(str::to_string).collect(),
        None => default,
    }
}

/// Parse the value for `key` as a base-10 integer.
///
/// A value that does not parse is recorded on `v` as
/// `must be an integer value` and `default` is returned.
pub fn read_int(qs: &QueryValues, key: &str, default: i64, v: &mut Validator) -> i64 {
    let Some(raw) = qs.non_empty(key) else {
        return default;
    };

    match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            v.add_error(key, "must be an integer value");
            default
        }
    }
}

/// A path id that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ID parameter")]
pub struct InvalidIdParam;

/// Parse a record id taken from the URL path.
pub fn read_id_param(raw: &str) -> Result<i64, InvalidIdParam> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(InvalidIdParam),
    }
}
