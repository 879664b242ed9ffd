//! Core domain library for the user API.
//!
//! This crate holds everything that does not touch HTTP: request validation,
//! list pagination and sorting, the `User` model and its rules, password
//! hashing, and the persistence contract with an in-memory implementation.
//! The service crates depend only on what is exported here.
//!

#![deny(warnings)]

pub mod error;
pub mod filters;
pub mod memory;
pub mod password;
pub mod store;
pub mod user;
pub mod validator;

pub use error::{Result, StoreError};
pub use filters::{calculate_metadata, Filters, Metadata, SortDirection, MAX_PAGE, MAX_PAGE_SIZE};
pub use memory::MemoryUserStore;
pub use password::{Password, PasswordError, FILTERED};
pub use store::UserStore;
pub use user::{validate_email, validate_password_plaintext, validate_user, User};
pub use validator::{matches, permitted_value, unique, Validator, EMAIL_RX, NAME_RX};
