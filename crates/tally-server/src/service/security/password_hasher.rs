//! Password hashing and verification using Argon2id.
//!
//! Hashes are stored in PHC string format, which embeds the algorithm,
//! parameters and the per-call random salt. Plaintext is never stored or
//! logged.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET;

/// Failure while hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum HasherError {
    /// The password does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    /// Argon2 itself failed.
    #[error("password hashing failed: {0}")]
    Internal(String),
}

/// Argon2id password hasher.
///
/// Clones share the hash used for unknown usernames.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Creates a new [`PasswordHasher`] with the default Argon2id parameters.
    ///
    /// Hashes a random throwaway password up front, so that the first
    /// unknown-username login costs no more than later ones.
    pub fn new() -> Self {
        let hasher = Self::default();
        hasher.dummy_hash();
        hasher
    }

    /// PHC hash of a random password nobody knows, computed once.
    fn dummy_hash(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            let password: String = rand::rng()
                .sample_iter(Alphanumeric)
                .take(24)
                .map(char::from)
                .collect();

            self.hash_password(&password).unwrap_or_default()
        })
    }

    /// Hashes a password with a freshly generated random salt.
    ///
    /// Two calls with the same password produce different hashes.
    pub fn hash_password(&self, password: &str) -> Result<String, HasherError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password hashing operation failed"
                );
                HasherError::Internal(e.to_string())
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), HasherError> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "Invalid password hash format in storage"
            );
            HasherError::MalformedHash(e.to_string())
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "Password verification failed");
                Err(HasherError::Mismatch)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password verification system error"
                );
                Err(HasherError::Internal(e.to_string()))
            }
        }
    }

    /// Verifies `password` against the precomputed dummy hash.
    ///
    /// Called when the username does not exist. It runs exactly one
    /// verification and no hashing, like a wrong password for a real user.
    /// Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, self.dummy_hash());
        false
    }
}
