use serde::{Deserialize, Serialize};

/// Registered JWT claims carried by a session token.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Token issuer.
    pub iss: String,
    /// Username the token was issued to.
    pub sub: String,
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expires at, seconds since the Unix epoch. Exclusive.
    pub exp: i64,
}

impl SessionClaims {
    /// Returns the bound username.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns `true` if the token is no longer valid at `now_secs`.
    #[inline]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        now_secs >= self.exp
    }
}
