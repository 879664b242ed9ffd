//! Persistence contract for user records.
//!
//! Handlers only see [`UserStore`]; a SQL-backed implementation and the
//! in-memory [`MemoryUserStore`](crate::memory::MemoryUserStore) are
//! interchangeable behind it.

use crate::error::Result;
use crate::filters::{Filters, Metadata};
use crate::user::User;

/// CRUD and list operations over [`User`] records.
///
/// Every method classifies its failure as a [`StoreError`](crate::StoreError):
/// `NotFound`, `EditConflict`, `DuplicateEmail`, or anything else.
pub trait UserStore: Send + Sync {
    /// Persist a new user, assigning its id and timestamps in place.
    ///
    /// Any pending plaintext password is hashed before storage.
    fn insert(&self, user: &mut User) -> Result<()>;

    /// Fetch a single user by id. Ids below 1 are never found.
    fn get(&self, id: i64) -> Result<User>;

    /// List users matching the `email` and `name` filters, paged and sorted
    /// according to `filters`.
    ///
    /// Empty `email`/`name` match every record. `filters` must have passed
    /// validation.
    fn get_all(&self, email: &str, name: &str, filters: &Filters) -> Result<(Vec<User>, Metadata)>;

    /// Store changes to an existing user.
    ///
    /// Fails with `EditConflict` when the stored `updated_at` differs from the
    /// caller's copy. On success `updated_at` is advanced in place.
    fn update(&self, user: &mut User) -> Result<()>;

    /// Remove a user by id.
    fn delete(&self, id: i64) -> Result<()>;
}
