//! In-memory [`UserStore`] implementation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Result, StoreError};
use crate::filters::{calculate_metadata, Filters, Metadata, SortDirection};
use crate::store::UserStore;
use crate::user::User;

/// Thread-safe user store backed by a `BTreeMap`.
///
/// Emails are unique case-insensitively. Updates use `updated_at` as the
/// optimistic-concurrency token.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.users.len()).unwrap_or(0)
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Other("user store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Other("user store lock poisoned".to_string()))
    }
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

impl UserStore for MemoryUserStore {
    fn insert(&self, user: &mut User) -> Result<()> {
        let mut inner = self.write()?;

        if inner.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        user.password.seal()?;

        inner.last_id += 1;
        let now = Utc::now();
        user.id = inner.last_id;
        user.created_at = now;
        user.updated_at = now;

        inner.users.insert(user.id, user.clone());
        tracing::debug!(id = user.id, "user inserted");
        Ok(())
    }

    fn get(&self, id: i64) -> Result<User> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn get_all(&self, email: &str, name: &str, filters: &Filters) -> Result<(Vec<User>, Metadata)> {
        let column = filters.sort_column();
        let direction = filters.sort_direction();
        let inner = self.read()?;

        let mut matched: Vec<&User> = inner
            .users
            .values()
            .filter(|u| email.is_empty() || u.email.eq_ignore_ascii_case(email))
            .filter(|u| name_matches(&u.name, name))
            .collect();

        let mut failure = None;
        matched.sort_by(|a, b| match compare_by(a, b, column) {
            Ok(ordering) => {
                let ordering = match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                ordering.then_with(|| a.id.cmp(&b.id))
            }
            Err(e) => {
                failure.get_or_insert(e);
                Ordering::Equal
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }

        let total = matched.len() as i64;
        let offset = usize::try_from(filters.offset()).unwrap_or(0);
        let limit = usize::try_from(filters.limit()).unwrap_or(0);

        let page = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((page, calculate_metadata(total, filters.page, filters.page_size)))
    }

    fn update(&self, user: &mut User) -> Result<()> {
        let mut inner = self.write()?;

        let stored_at = match inner.users.get(&user.id) {
            Some(stored) if stored.updated_at == user.updated_at => stored.updated_at,
            _ => return Err(StoreError::EditConflict),
        };

        if inner.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::DuplicateEmail);
        }

        user.password.seal()?;
        user.updated_at = next_timestamp(stored_at);

        inner.users.insert(user.id, user.clone());
        tracing::debug!(id = user.id, "user updated");
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        match self.write()?.users.remove(&id) {
            Some(_) => {
                tracing::debug!(id, "user deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

/// Every word of `query` must appear as a word of `name`, ignoring case.
fn name_matches(name: &str, query: &str) -> bool {
    let words: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();

    query
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|q| words.contains(&q))
}

fn compare_by(a: &User, b: &User, column: &str) -> Result<Ordering> {
    Ok(match column {
        "id" => a.id.cmp(&b.id),
        "name" => a.name.cmp(&b.name),
        "email" => a.email.cmp(&b.email),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        other => {
            return Err(StoreError::Other(format!("unsupported sort column {other}")));
        }
    })
}

/// A timestamp strictly after `previous`, so concurrent readers always see
/// the version change.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}
