//! Identity response types.

use jiff::Timestamp;
use serde::Serialize;

use crate::service::SessionToken;
use crate::service::store::Identity;

/// Public view of an account. Never includes the password hash.
#[must_use]
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<Identity> for User {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
        }
    }
}

/// Response returned after successful login. The token itself travels in
/// the `Set-Cookie` header only.
#[must_use]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<&SessionToken> for Session {
    fn from(token: &SessionToken) -> Self {
        Self {
            username: token.subject.clone(),
            issued_at: token.issued_at,
            expires_at: token.expires_at,
        }
    }
}
