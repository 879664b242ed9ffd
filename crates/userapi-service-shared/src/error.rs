//! Mapping of every failure a handler can hit onto a JSON error envelope.
//!
//! All error bodies have the shape `{"error": <message or field map>}` and are
//! written through [`write_json`]. Server-side failures are logged in full and
//! answered with a generic message.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use userapi_lib::StoreError;

use crate::codec::{write_json, DecodeError, Envelope};
use crate::query::InvalidIdParam;

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "a user with this email address already exists";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Any failure a handler reports to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Arbitrary client error with its own status.
    #[error("{message}")]
    Client { status: StatusCode, message: String },

    #[error("{0}")]
    BadRequest(String),

    /// Accumulated validation failures, keyed by field.
    #[error("failed validation")]
    FailedValidation(BTreeMap<String, String>),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    #[error("{}", EDIT_CONFLICT_MESSAGE)]
    EditConflict,

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimitExceeded,

    /// Logged, never shown to the client.
    #[error("internal error: {0}")]
    Internal(BoxError),
}

/// Payload placed under the `"error"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Message(String),
    Fields(BTreeMap<String, String>),
}

impl ApiError {
    pub fn client(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
        }
    }

    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Client { status, .. } => *status,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::EditConflict => StatusCode::CONFLICT,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-visible error payload.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::FailedValidation(errors) => ErrorBody::Fields(errors.clone()),
            Self::Internal(_) => ErrorBody::Message(SERVER_ERROR_MESSAGE.to_string()),
            other => ErrorBody::Message(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            tracing::error!(error = %err, "internal server error");
        }

        match write_json(self.status(), &Envelope::new("error", self.body()), HeaderMap::new()) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::internal(err)
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::EditConflict => Self::EditConflict,
            StoreError::DuplicateEmail => Self::FailedValidation(BTreeMap::from([(
                "email".to_string(),
                DUPLICATE_EMAIL_MESSAGE.to_string(),
            )])),
            other => Self::internal(other),
        }
    }
}

impl From<InvalidIdParam> for ApiError {
    fn from(_: InvalidIdParam) -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{capture_logs, response_json};
    use serde_json::json;

    #[tokio::test]
    async fn test_message_errors() {
        let cases = [
            (
                ApiError::client(StatusCode::FORBIDDEN, "nope"),
                StatusCode::FORBIDDEN,
                "nope".to_string(),
            ),
            (
                ApiError::BadRequest("the body must not be empty".into()),
                StatusCode::BAD_REQUEST,
                "the body must not be empty".to_string(),
            ),
            (ApiError::NotFound, StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
            (
                ApiError::MethodNotAllowed(Method::GET),
                StatusCode::METHOD_NOT_ALLOWED,
                "the GET method is not supported for this resource".to_string(),
            ),
            (ApiError::EditConflict, StatusCode::CONFLICT, EDIT_CONFLICT_MESSAGE.to_string()),
            (
                ApiError::RateLimitExceeded,
                StatusCode::TOO_MANY_REQUESTS,
                RATE_LIMIT_MESSAGE.to_string(),
            ),
        ];

        for (err, status, message) in cases {
            let (got_status, body) = response_json(err.into_response()).await;
            assert_eq!(got_status, status);
            assert_eq!(body, json!({ "error": message }));
        }
    }

    #[tokio::test]
    async fn test_failed_validation_body() {
        let errors = BTreeMap::from([
            ("name".to_string(), "too short".to_string()),
            ("email".to_string(), "duplicates".to_string()),
        ]);

        let response = ApiError::FailedValidation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &bytes[..],
            br#"{"error":{"email":"duplicates","name":"too short"}}"#
        );
    }

    #[tokio::test]
    async fn test_internal_error_is_logged_not_sent() {
        let (response, logs) = capture_logs(|| {
            ApiError::internal(std::io::Error::other("disk on fire")).into_response()
        });

        let (status, body) = response_json(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": SERVER_ERROR_MESSAGE }));
        assert!(logs.contains("disk on fire"), "logs: {logs}");
    }

    #[test]
    fn test_from_decode_error() {
        let err = ApiError::from(DecodeError::Empty);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), ErrorBody::Message("the body must not be empty".into()));

        let internal = serde_json::from_str::<u8>("300").unwrap_err();
        let err = ApiError::from(DecodeError::Internal(internal));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_store_error() {
        assert_eq!(ApiError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(StoreError::EditConflict).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(StoreError::Other("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = ApiError::from(StoreError::DuplicateEmail);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.body(),
            ErrorBody::Fields(BTreeMap::from([(
                "email".to_string(),
                DUPLICATE_EMAIL_MESSAGE.to_string()
            )]))
        );
    }

    #[test]
    fn test_invalid_id_is_not_found() {
        assert_eq!(ApiError::from(InvalidIdParam).status(), StatusCode::NOT_FOUND);
    }
}
