use thiserror::Error;

use crate::password::PasswordError;

/// Convenient result alias for persistence operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome classification shared by every [`UserStore`](crate::UserStore)
/// implementation and the HTTP error responder.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("record not found")]
    NotFound,

    /// The record changed since the caller read it.
    #[error("edit conflict")]
    EditConflict,

    /// Another user already owns the email address.
    #[error("duplicate email")]
    DuplicateEmail,

    /// Password hashing failed while preparing the record.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Any other persistence failure.
    #[error("{0}")]
    Other(String),
}
