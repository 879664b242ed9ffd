//! User records and their validation rules.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::password::Password;
use crate::validator::{matches, Validator, EMAIL_RX, NAME_RX};

/// Minimum password length in bytes.
pub const PASSWORD_MIN_BYTES: usize = 8;

/// Maximum password length in bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// A registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: Password,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build an unsaved user from client input.
    ///
    /// `id` and timestamps are assigned by the store on insert.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            password: Password::from_plaintext(password),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Email must be present and look like an address.
pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "can't be blank");
    v.check(
        matches(email, &EMAIL_RX),
        "email",
        "does not look like a valid email",
    );
}

/// Plaintext password length policy.
pub fn validate_password_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "password", "can't be blank");
    v.check(
        plaintext.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        plaintext.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

/// Validate every user-supplied field.
///
/// The password is only checked when a new plaintext is pending; an already
/// hashed password is accepted as-is.
pub fn validate_user(v: &mut Validator, user: &User) {
    v.check(!user.name.is_empty(), "name", "can't be blank");
    v.check(
        user.name.len() > 5,
        "name",
        "can't be less than 5 characters",
    );
    v.check(
        matches(&user.name, &NAME_RX),
        "name",
        "does not look like a valid name",
    );

    validate_email(v, &user.email);

    if let Some(plaintext) = user.password.plaintext() {
        validate_password_plaintext(v, plaintext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(user: &User) -> Validator {
        let mut v = Validator::new();
        validate_user(&mut v, user);
        v
    }

    #[test]
    fn test_valid_user() {
        let user = User::new("John Doe", "john@example.com", "Secret123!");
        assert!(errors_for(&user).valid());
    }

    #[test]
    fn test_blank_fields_report_blank_only() {
        let user = User::new("", "", "");
        let v = errors_for(&user);

        assert_eq!(v.errors()["name"], "can't be blank");
        assert_eq!(v.errors()["email"], "can't be blank");
        assert_eq!(v.errors()["password"], "can't be blank");
    }

    #[test]
    fn test_short_name() {
        let v = errors_for(&User::new("Jo", "jo@example.com", "Secret123!"));
        assert_eq!(v.errors()["name"], "can't be less than 5 characters");
    }

    #[test]
    fn test_malformed_name() {
        let v = errors_for(&User::new("R2-D2 unit", "r2@example.com", "Secret123!"));
        assert_eq!(v.errors()["name"], "does not look like a valid name");
    }

    #[test]
    fn test_malformed_email() {
        let v = errors_for(&User::new("John Doe", "john.example.com", "Secret123!"));
        assert_eq!(v.errors()["email"], "does not look like a valid email");
    }

    #[test]
    fn test_password_length_bounds() {
        let v = errors_for(&User::new("John Doe", "john@example.com", "short"));
        assert_eq!(v.errors()["password"], "must be at least 8 bytes long");

        let long = "x".repeat(PASSWORD_MAX_BYTES + 1);
        let v = errors_for(&User::new("John Doe", "john@example.com", long));
        assert_eq!(v.errors()["password"], "must not be more than 72 bytes long");

        let exact = "x".repeat(PASSWORD_MAX_BYTES);
        assert!(errors_for(&User::new("John Doe", "john@example.com", exact)).valid());
    }

    #[test]
    fn test_hashed_password_skips_plaintext_rules() {
        let mut user = User::new("John Doe", "john@example.com", "Secret123!");
        user.password.seal().unwrap();
        assert!(errors_for(&user).valid());
    }

    #[test]
    fn test_user_serialization_filters_password() {
        let user = User::new("John Doe", "john@example.com", "Secret123!");
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["password"], "[FILTERED]");
        assert_eq!(json["name"], "John Doe");
        assert_eq!(json["email"], "john@example.com");
        assert!(json["created_at"].is_string());
    }
}
