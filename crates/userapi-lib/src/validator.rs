//! Accumulating field validator.
//!
//! A [`Validator`] collects one message per field so that a single response can
//! report every invalid input at once. The first failure recorded for a field
//! wins; later checks against the same field are ignored.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

/// Loose email shape check (local part, `@`, dotted domain).
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

/// Person names: letters, separated by spaces, apostrophes, dots or hyphens.
pub static NAME_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{L}+(?:[ '.\-]+\p{L}+)*\.?$").expect("name regex is valid"));

/// Collects named validation failures for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Create an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when at least one error has been recorded.
    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    /// Record `message` under `field` unless the field already has an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` under `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Recorded errors keyed by field name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Consume the validator, returning its errors.
    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// Whether `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Whether `value` matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Whether every item in `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_is_valid() {
        let v = Validator::new();
        assert!(v.valid());
        assert!(!v.invalid());
        assert!(v.errors().is_empty());
    }

    #[test]
    fn test_check_records_failure() {
        let mut v = Validator::new();
        v.check(false, "email", "can't be blank");
        assert!(v.invalid());
        assert_eq!(v.errors().get("email").map(String::as_str), Some("can't be blank"));
    }

    #[test]
    fn test_check_ignores_passing_condition() {
        let mut v = Validator::new();
        v.check(true, "email", "can't be blank");
        assert!(v.valid());
    }

    #[test]
    fn test_first_error_for_field_wins() {
        let mut v = Validator::new();
        v.check(false, "name", "can't be blank");
        v.check(false, "name", "does not look like a valid name");
        v.add_error("name", "too short");

        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["name"], "can't be blank");
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(false, "page_size", "must be a maximum of 100");

        let errors = v.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("page"));
        assert!(errors.contains_key("page_size"));
    }

    #[test]
    fn test_permitted_value() {
        let list = ["id", "name"];
        assert!(permitted_value(&"id", &list));
        assert!(!permitted_value(&"email", &list));
    }

    #[test]
    fn test_unique() {
        assert!(unique(&["a", "b", "c"]));
        assert!(!unique(&["a", "b", "a"]));
        assert!(unique::<&str>(&[]));
    }

    #[test]
    fn test_email_rx() {
        assert!(matches("test@example.com", &EMAIL_RX));
        assert!(matches("first.last+tag@sub.example.co.uk", &EMAIL_RX));
        assert!(!matches("not-an-email", &EMAIL_RX));
        assert!(!matches("a@", &EMAIL_RX));
        assert!(!matches("", &EMAIL_RX));
    }

    #[test]
    fn test_name_rx() {
        assert!(matches("John Doe", &NAME_RX));
        assert!(matches("Anne-Marie O'Neil", &NAME_RX));
        assert!(matches("Zoë Åberg", &NAME_RX));
        assert!(!matches("R2-D2", &NAME_RX));
        assert!(!matches(" John", &NAME_RX));
        assert!(!matches("", &NAME_RX));
    }
}
