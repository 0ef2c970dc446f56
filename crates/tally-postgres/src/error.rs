//! Storage errors raised by the client and the query traits.

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::result::{ConnectionError, DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::PoolError as ManagerError;
use diesel_async::pooled_connection::deadpool::PoolError;

use crate::TRACING_TARGET_CONNECTION;

/// Specialized [`Result`] for storage operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

/// Failure of a storage operation.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Rejected settings, reported before any connection is attempted.
    #[error("invalid database configuration: {0}")]
    Config(Cow<'static, str>),

    /// No connection became available in time.
    #[error("timed out waiting for a database connection")]
    Timeout(TimeoutType),

    #[error("database connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// The statement reached the server and failed there, or its result
    /// could not be decoded.
    #[error("database query failed: {0}")]
    Query(#[from] DieselError),

    #[error("unexpected database error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Name of the violated constraint, if the server reported one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::Query(DieselError::DatabaseError(_, info)) => info.constraint_name(),
            _ => None,
        }
    }

    /// True for `UNIQUE` violations, e.g. a taken username.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Query(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        )
    }

    /// True when the database could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

impl From<PoolError> for PgError {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Timeout(kind) => Self::Timeout(kind),
            PoolError::Backend(ManagerError::ConnectionError(error)) => Self::Connection(error),
            PoolError::Backend(ManagerError::QueryError(error)) => Self::Query(error),
            PoolError::Closed => Self::Unexpected("connection pool was closed".into()),
            PoolError::NoRuntimeSpecified => Self::Unexpected("pool has no async runtime".into()),
            PoolError::PostCreateHook(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "Post-create hook rejected a connection"
                );
                Self::Unexpected(error.to_string().into())
            }
        }
    }
}
