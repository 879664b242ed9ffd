//! Shared state handed to every handler.

use std::sync::Arc;

use userapi_lib::{MemoryUserStore, UserStore};

use crate::config::Environment;

/// Handler state: the user store plus deployment details.
///
/// Cloning is cheap; all clones share one store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    environment: Environment,
    version: String,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, environment: Environment, version: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users,
                environment,
                version: version.into(),
            }),
        }
    }

    /// State backed by an empty [`MemoryUserStore`] and this crate's version.
    pub fn in_memory(environment: Environment) -> Self {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            environment,
            env!("CARGO_PKG_VERSION"),
        )
    }

    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.inner.environment)
            .field("version", &self.inner.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userapi_lib::User;

    #[test]
    fn test_clones_share_store() {
        let state = AppState::in_memory(Environment::Development);
        let clone = state.clone();

        state
            .users()
            .insert(&mut User::new("John Doe", "john@example.com", "Secret123!"))
            .unwrap();

        assert_eq!(clone.users().get(1).unwrap().email, "john@example.com");
        assert_eq!(clone.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_debug_omits_store() {
        let debug = format!("{:?}", AppState::in_memory(Environment::Production));
        assert!(debug.contains("AppState"));
        assert!(debug.contains("Production"));
    }
}
