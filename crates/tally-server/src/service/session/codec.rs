//! Issuing and verifying session tokens.

use std::time::Duration;

use jiff::Timestamp;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};

use super::SessionClaims;
use crate::service::SessionKeys;
use crate::utility::tracing_targets::TRACING_TARGET_SESSION as TRACING_TARGET;

/// Reasons a session token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The token could not be parsed, or lacks required claims.
    #[error("session token is malformed")]
    Malformed,
    /// The MAC does not match the signing secret.
    #[error("session token signature is invalid")]
    BadSignature,
    /// The current time is at or after `exp`.
    #[error("session token has expired")]
    Expired,
    /// A token could not be produced.
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// A freshly issued, signed session token.
#[must_use]
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Compact JWT serialization.
    pub token: String,
    /// Username bound into the token.
    pub subject: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl SessionToken {
    /// Seconds between issuance and expiry.
    #[inline]
    pub fn max_age_secs(&self) -> i64 {
        self.expires_at.as_second() - self.issued_at.as_second()
    }
}

/// Signs and verifies session tokens with a process-wide secret.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    keys: SessionKeys,
    issuer: String,
    ttl: Duration,
    validation: Validation,
}

impl SessionCodec {
    /// Creates a codec issuing tokens for `issuer` that live for `ttl`.
    pub fn new(keys: SessionKeys, issuer: impl Into<String>, ttl: Duration) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);
        validation.set_issuer(&[issuer.as_str()]);

        Self {
            keys,
            issuer,
            ttl,
            validation,
        }
    }

    /// Returns the lifetime of newly issued tokens.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `username`, valid from now for the configured TTL.
    pub fn issue(&self, username: &str) -> Result<SessionToken, SessionError> {
        self.issue_at(username, Timestamp::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, username: &str, now: Timestamp) -> Result<SessionToken, SessionError> {
        let iat = now.as_second();
        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| SessionError::Signing("session ttl out of range".into()))?;
        let exp = iat
            .checked_add(ttl_secs)
            .ok_or_else(|| SessionError::Signing("session expiry out of range".into()))?;

        let issued_at =
            Timestamp::from_second(iat).map_err(|e| SessionError::Signing(e.to_string()))?;
        let expires_at =
            Timestamp::from_second(exp).map_err(|e| SessionError::Signing(e.to_string()))?;

        let claims = SessionClaims {
            iss: self.issuer.clone(),
            sub: username.to_owned(),
            iat,
            exp,
        };

        let header = Header::new(Algorithm::HS256);
        let token = jsonwebtoken::encode(&header, &claims, self.keys.encoding_key()).map_err(
            |e| {
                tracing::error!(target: TRACING_TARGET, error = %e, "Failed to sign session token");
                SessionError::Signing(e.to_string())
            },
        )?;

        tracing::debug!(
            target: TRACING_TARGET,
            username = %username,
            expires_at = %expires_at,
            "Session token issued"
        );

        Ok(SessionToken {
            token,
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }

    /// Verifies a token and returns the bound username.
    ///
    /// No storage lookup takes place.
    pub fn verify(&self, token: &str) -> Result<String, SessionError> {
        self.verify_at(token, Timestamp::now())
            .map(|claims| claims.sub)
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// The signature is checked before expiry, so a forged token is always
    /// reported as [`SessionError::BadSignature`].
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<SessionClaims, SessionError> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token, self.keys.decoding_key(), &self.validation)
                .map_err(|e| {
                    let error = match e.kind() {
                        JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                            SessionError::BadSignature
                        }
                        _ => SessionError::Malformed,
                    };

                    tracing::debug!(
                        target: TRACING_TARGET,
                        error = %e,
                        rejection = %error,
                        "Session token rejected"
                    );

                    error
                })?;

        let claims = data.claims;
        if claims.is_expired_at(now.as_second()) {
            tracing::debug!(
                target: TRACING_TARGET,
                username = %claims.sub,
                exp = claims.exp,
                "Session token expired"
            );
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}
