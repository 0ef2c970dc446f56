//! Identity request types.

use serde::Deserialize;
use validator::Validate;

use super::{is_email_or_empty, is_not_blank};

/// Request payload for registration.
///
/// `email` is optional; `/register` and `/create-user` share this payload.
#[must_use]
#[derive(Debug, Deserialize, Validate)]
pub struct Register {
    /// Unique, immutable account name.
    #[validate(length(min = 1, max = 50), custom(function = "is_not_blank"))]
    pub username: String,

    /// Plaintext password; only its hash is stored.
    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// Contact address.
    #[serde(default)]
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
}

/// Request payload for login.
#[must_use]
#[derive(Debug, Deserialize, Validate)]
pub struct Login {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Request payload for editing the caller's own profile.
///
/// Absent fields are left untouched; an empty `email` clears it. Any
/// `username` in the body is ignored.
#[must_use]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditUser {
    #[serde(default)]
    #[validate(length(max = 100), custom(function = "is_email_or_empty"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
}

impl EditUser {
    /// Maps the wire form of `email` to a change: `None` keeps, `Some(None)`
    /// clears, `Some(Some(_))` sets.
    pub fn email_change(&self) -> Option<Option<String>> {
        self.email.as_ref().map(|email| {
            let email = email.trim();
            (!email.is_empty()).then(|| email.to_owned())
        })
    }
}
