use tally_postgres::PgError;

use crate::utility::tracing_targets::TRACING_TARGET_STORE as TRACING_TARGET;

/// Backend-neutral storage failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflicting record: {0}")]
    Conflict(String),
    /// Storage could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Any other backend failure.
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Result alias for storage operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;

impl From<PgError> for StoreError {
    fn from(error: PgError) -> Self {
        if error.is_unique_violation() {
            let constraint = error.constraint().unwrap_or("unique").to_owned();
            tracing::debug!(target: TRACING_TARGET, constraint = %constraint, "Unique violation");
            return Self::Conflict(constraint);
        }

        if error.is_unreachable() {
            tracing::warn!(target: TRACING_TARGET, error = %error, "Database unavailable");
            return Self::Unavailable(error.to_string());
        }

        tracing::error!(target: TRACING_TARGET, error = %error, "Database error");
        Self::Backend(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tally_postgres::TimeoutType;

    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        let error = StoreError::from(PgError::Timeout(TimeoutType::Wait));
        assert!(matches!(error, StoreError::Unavailable(_)));
    }

    #[test]
    fn config_error_is_backend_failure() {
        let error = StoreError::from(PgError::Config("bad".into()));
        assert!(matches!(error, StoreError::Backend(_)));
    }
}
