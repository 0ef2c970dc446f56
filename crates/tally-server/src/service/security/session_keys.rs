//! HMAC signing keys for session tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::utility::tracing_targets::TRACING_TARGET_SESSION as TRACING_TARGET;
use crate::{Error, Result};

/// Minimum accepted length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Process-wide HS256 keys derived from the signing secret.
///
/// Built once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionKeys {
    /// Derives signing keys from a shared secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or is only whitespace.
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::config("session signing secret is empty"));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "session signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let inner = SessionKeysInner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        };

        tracing::debug!(target: TRACING_TARGET, "Session signing keys derived");

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the key used to sign new tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify token signatures.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}
