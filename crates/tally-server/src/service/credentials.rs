//! Identity registration, password verification and profile management.

use std::sync::Arc;

use super::security::{HasherError, PasswordHasher};
use super::store::{Identity, IdentityBackend, IdentityChanges, NewIdentity, StoreError};
use crate::utility::tracing_targets::TRACING_TARGET_CREDENTIALS as TRACING_TARGET;

/// Failures of [`CredentialStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown username or wrong password; both produce this same error.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// The username is already registered.
    #[error("username is already taken")]
    Conflict,
    /// The identity no longer exists.
    #[error("identity not found")]
    NotFound,
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
    /// Storage failed.
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(_) => Self::Conflict,
            other => Self::Storage(other),
        }
    }
}

/// Requested profile changes, with the password still in plaintext.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// `Some(None)` clears the email.
    pub email: Option<Option<String>>,
    pub password: Option<String>,
}

/// Credential store over an [`IdentityBackend`].
///
/// Every call goes to storage; nothing is cached.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn IdentityBackend>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    /// Creates a new store using the given backend and hasher.
    pub fn new(backend: Arc<dyn IdentityBackend>, hasher: PasswordHasher) -> Self {
        Self { backend, hasher }
    }

    /// Registers a new identity, storing only a salted hash of the password.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> Result<Identity, CredentialError> {
        let password_hash = self.hash(password)?;

        let new_identity = NewIdentity {
            username: username.to_owned(),
            email,
            password_hash,
        };

        let identity = self.backend.insert_identity(new_identity).await.map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                username = %username,
                error = %e,
                "Registration rejected by storage"
            );
            CredentialError::from(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = identity.id,
            username = %identity.username,
            "Identity registered"
        );

        Ok(identity)
    }

    /// Checks a username and password pair.
    ///
    /// Unknown usernames still pay for one hash verification.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, CredentialError> {
        let Some(stored) = self.backend.find_identity(username).await? else {
            self.hasher.verify_dummy_password(password);
            tracing::debug!(target: TRACING_TARGET, "Login for unknown username");
            return Err(CredentialError::InvalidCredentials);
        };

        match self.hasher.verify_password(password, &stored.password_hash) {
            Ok(()) => Ok(stored.identity),
            Err(HasherError::Mismatch) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    user_id = stored.identity.id,
                    "Login with wrong password"
                );
                Err(CredentialError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    user_id = stored.identity.id,
                    error = %e,
                    "Stored password hash could not be checked"
                );
                Err(CredentialError::InvalidCredentials)
            }
        }
    }

    /// Updates the email and/or password of `username`.
    pub async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Identity, CredentialError> {
        let password_hash = update
            .password
            .as_deref()
            .map(|password| self.hash(password))
            .transpose()?;

        let changes = IdentityChanges {
            email: update.email,
            password_hash,
        };

        let password_changed = changes.password_hash.is_some();
        let identity = self
            .backend
            .update_identity(username, changes)
            .await?
            .ok_or(CredentialError::NotFound)?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = identity.id,
            password_changed,
            "Identity profile updated"
        );

        Ok(identity)
    }

    /// Removes `username` from the directory along with its expenses, so a
    /// later registration of the same name starts empty.
    pub async fn remove(&self, username: &str) -> Result<(), CredentialError> {
        if !self.backend.delete_identity(username).await? {
            return Err(CredentialError::NotFound);
        }

        tracing::info!(target: TRACING_TARGET, username = %username, "Identity removed");
        Ok(())
    }

    /// Lists all registered identities, without password hashes.
    pub async fn list(&self) -> Result<Vec<Identity>, CredentialError> {
        Ok(self.backend.list_identities().await?)
    }

    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        self.hasher
            .hash_password(password)
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::store::MemoryBackend;

    fn store() -> (CredentialStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = CredentialStore::new(Arc::new(backend.clone()), PasswordHasher::new());
        (store, backend)
    }

    #[tokio::test]
    async fn registered_user_verifies() -> anyhow::Result<()> {
        let (store, _) = store();
        let registered = store.register("alice", "pw1", None).await?;
        let verified = store.verify("alice", "pw1").await?;

        assert_eq!(registered, verified);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() -> anyhow::Result<()> {
        let (store, _) = store();
        let _alice = store.register("alice", "pw1", None).await?;

        let wrong_password = store.verify("alice", "nope").await.unwrap_err();
        let unknown_user = store.verify("mallory", "pw1").await.unwrap_err();

        assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
        assert!(matches!(unknown_user, CredentialError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn plaintext_is_never_stored() -> anyhow::Result<()> {
        let (store, backend) = store();
        let _alice = store.register("alice", "pw1", None).await?;

        let stored = backend.find_identity("alice").await?.expect("stored");
        assert_ne!(stored.password_hash, "pw1");
        assert!(stored.password_hash.starts_with("$argon2id$"));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() -> anyhow::Result<()> {
        let (store, _) = store();
        let _alice = store.register("alice", "pw1", None).await?;

        let error = store.register("alice", "pw2", None).await.unwrap_err();
        assert!(matches!(error, CredentialError::Conflict));

        // The original password still works.
        let _verified = store.verify("alice", "pw1").await?;
        Ok(())
    }

    #[tokio::test]
    async fn password_change_takes_effect() -> anyhow::Result<()> {
        let (store, _) = store();
        let _alice = store.register("alice", "pw1", None).await?;

        let update = ProfileUpdate {
            email: Some(Some("alice@example.com".into())),
            password: Some("pw2".into()),
        };
        let identity = store.update_profile("alice", update).await?;

        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
        assert!(store.verify("alice", "pw1").await.is_err());
        let _verified = store.verify("alice", "pw2").await?;
        Ok(())
    }

    #[tokio::test]
    async fn removed_user_cannot_log_in() -> anyhow::Result<()> {
        let (store, _) = store();
        let _alice = store.register("alice", "pw1", None).await?;
        store.remove("alice").await?;

        assert!(matches!(
            store.verify("alice", "pw1").await,
            Err(CredentialError::InvalidCredentials)
        ));
        assert!(matches!(
            store.remove("alice").await,
            Err(CredentialError::NotFound)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn storage_outage_is_not_reported_as_bad_credentials() -> anyhow::Result<()> {
        let (store, backend) = store();
        let _alice = store.register("alice", "pw1", None).await?;
        backend.set_available(false);

        assert!(matches!(
            store.verify("alice", "pw1").await,
            Err(CredentialError::Storage(StoreError::Unavailable(_)))
        ));
        Ok(())
    }
}
