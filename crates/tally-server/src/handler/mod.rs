//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,no_run
//! use tally_server::handler::{ServiceKind, routes};
//! use tally_server::service::store::MemoryBackend;
//! use tally_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::builder()
//!     .with_auth_signing_secret(std::env::var("AUTH_SIGNING_SECRET")?)
//!     .build()?;
//! let state = ServiceState::with_backend(MemoryBackend::new(), &config)?;
//! let app: axum::Router = routes(ServiceKind::Combined).with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod error;
mod expenses;
mod identities;
mod monitors;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub(crate) use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

/// Route groups mounted by one server process.
///
/// Identities and expenses can be deployed as separate services or together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceKind {
    /// Registration, login and the user directory.
    Identity,
    /// Owner-scoped expense records.
    Expense,
    /// Both groups.
    #[default]
    Combined,
}

impl ServiceKind {
    /// Returns `true` if identity routes are mounted.
    #[inline]
    pub fn serves_identities(self) -> bool {
        matches!(self, Self::Identity | Self::Combined)
    }

    /// Returns `true` if expense routes are mounted.
    #[inline]
    pub fn serves_expenses(self) -> bool {
        matches!(self, Self::Expense | Self::Combined)
    }
}

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with the routes of the given service kind.
///
/// `GET /readiness` is always mounted.
pub fn routes(kind: ServiceKind) -> Router<ServiceState> {
    let mut router = Router::new().merge(monitors::routes());

    if kind.serves_identities() {
        router = router
            .merge(identities::routes())
            .merge(accounts::routes());
    }

    if kind.serves_expenses() {
        router = router.merge(expenses::routes());
    }

    router.fallback(fallback)
}
