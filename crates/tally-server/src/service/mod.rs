//! Application state and dependency injection.

mod bootstrap;
mod config;
mod credentials;
mod expenses;
mod health;
mod security;
mod session;
pub mod store;

use std::sync::Arc;

use tally_postgres::PgClient;

pub use crate::service::bootstrap::{BootstrapError, BootstrapState, RetryPolicy, Supervisor};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::credentials::{CredentialError, CredentialStore, ProfileUpdate};
pub use crate::service::expenses::{ExpenseDraft, ExpenseError, ExpenseStore, normalize_amount};
pub use crate::service::health::HealthProbe;
pub use crate::service::security::{HasherError, MIN_SECRET_LEN, PasswordHasher, SessionKeys};
pub use crate::service::session::{SessionClaims, SessionCodec, SessionError, SessionToken};
use crate::service::store::{ExpenseBackend, IdentityBackend, PgBackend, StorageProbe};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). Storage is
/// passed in explicitly, so tests can run against
/// [`MemoryBackend`](store::MemoryBackend).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub credentials: CredentialStore,
    pub expenses: ExpenseStore,
    pub sessions: SessionCodec,
    pub health: HealthProbe,
}

impl ServiceState {
    /// Builds the state over a single backend that stores both identities
    /// and expenses.
    pub fn with_backend<B>(backend: B, config: &ServiceConfig) -> Result<Self>
    where
        B: IdentityBackend + ExpenseBackend + StorageProbe + 'static,
    {
        let backend = Arc::new(backend);

        Ok(Self {
            credentials: CredentialStore::new(backend.clone(), PasswordHasher::new()),
            expenses: ExpenseStore::new(backend.clone()),
            sessions: config.session_codec()?,
            health: HealthProbe::new(backend),
        })
    }

    /// Builds the state over PostgreSQL.
    pub fn from_postgres(client: PgClient, config: &ServiceConfig) -> Result<Self> {
        Self::with_backend(PgBackend::new(client), config)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(credentials: CredentialStore);
impl_di!(expenses: ExpenseStore);
impl_di!(sessions: SessionCodec);
impl_di!(health: HealthProbe);
