//! Password storage for user records.
//!
//! Plaintext is held only between request decoding and persistence; the store
//! replaces it with an Argon2id PHC hash. The password never serializes to
//! anything other than `"[FILTERED]"`.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Placeholder written in place of any password in API output.
pub const FILTERED: &str = "[FILTERED]";

/// Failure while hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// No plaintext was available to hash.
    #[error("password has no plaintext to hash")]
    MissingPlaintext,

    /// The underlying Argon2 operation failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// A user's password: optional plaintext plus optional stored hash.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password {
    plaintext: Option<String>,
    hash: Option<String>,
}

impl Password {
    /// Wrap a plaintext password that has not been hashed yet.
    pub fn from_plaintext(plaintext: impl Into<String>) -> Self {
        Self {
            plaintext: Some(plaintext.into()),
            hash: None,
        }
    }

    /// Plaintext awaiting hashing, if any.
    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }

    /// Stored PHC hash, if any.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Replace the plaintext, discarding any previous hash.
    pub fn set(&mut self, plaintext: impl Into<String>) {
        self.plaintext = Some(plaintext.into());
        self.hash = None;
    }

    /// Hash the pending plaintext and drop it.
    ///
    /// A password that is already hashed and has no pending plaintext is left
    /// unchanged.
    pub fn seal(&mut self) -> Result<(), PasswordError> {
        let Some(plaintext) = self.plaintext.take() else {
            return match self.hash {
                Some(_) => Ok(()),
                None => Err(PasswordError::MissingPlaintext),
            };
        };

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        self.hash = Some(hash.to_string());
        Ok(())
    }

    /// Check `candidate` against the stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and `Err` only if the stored hash is
    /// missing or unreadable.
    pub fn matches(&self, candidate: &str) -> Result<bool, PasswordError> {
        let hash = self.hash.as_deref().ok_or(PasswordError::MissingPlaintext)?;
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Hash(e.to_string()))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(FILTERED)
    }
}

impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(FILTERED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_hashes_and_drops_plaintext() {
        let mut password = Password::from_plaintext("correct horse");
        password.seal().unwrap();

        assert!(password.plaintext().is_none());
        assert!(password.hash().unwrap().starts_with("$argon2id$"));
        assert!(password.matches("correct horse").unwrap());
        assert!(!password.matches("wrong horse").unwrap());
    }

    #[test]
    fn test_seal_without_plaintext_or_hash_fails() {
        let mut password = Password::default();
        assert!(matches!(password.seal(), Err(PasswordError::MissingPlaintext)));
    }

    #[test]
    fn test_seal_is_noop_when_already_hashed() {
        let mut password = Password::from_plaintext("correct horse");
        password.seal().unwrap();
        let first = password.hash().map(String::from);

        password.seal().unwrap();
        assert_eq!(password.hash().map(String::from), first);
    }

    #[test]
    fn test_set_discards_previous_hash() {
        let mut password = Password::from_plaintext("first password");
        password.seal().unwrap();
        password.set("second password");

        assert!(password.hash().is_none());
        assert_eq!(password.plaintext(), Some("second password"));
    }

    #[test]
    fn test_serializes_as_filtered() {
        let password = Password::from_plaintext("secret123");
        assert_eq!(serde_json::to_string(&password).unwrap(), "\"[FILTERED]\"");
        assert_eq!(format!("{:?}", password), "[FILTERED]");
    }
}
