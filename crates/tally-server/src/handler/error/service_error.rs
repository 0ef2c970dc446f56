//! Service error to HTTP error conversions.
//!
//! Failure details are logged here and never reach the response body.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::store::StoreError;
use crate::service::{CredentialError, ExpenseError, SessionError};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "tally_server::handler::service";

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(constraint) => {
                tracing::debug!(target: TRACING_TARGET, constraint = %constraint, "Conflict");
                ErrorKind::Conflict.into_error()
            }
            StoreError::Unavailable(_) => {
                tracing::warn!(target: TRACING_TARGET, error = %error, "Storage unavailable");
                ErrorKind::InternalServerError.into_error()
            }
            StoreError::Backend(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "Storage failure");
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

impl From<CredentialError> for HttpError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::InvalidCredentials => ErrorKind::Unauthorized
                .with_message("Invalid username or password")
                .with_resource("authentication"),
            CredentialError::Conflict => ErrorKind::Conflict
                .with_message("Username is already taken")
                .with_resource("users"),
            CredentialError::NotFound => ErrorKind::NotFound
                .with_message("User not found")
                .with_resource("users"),
            CredentialError::Hashing(reason) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    reason = %reason,
                    "Password hashing failed"
                );
                ErrorKind::InternalServerError.into_error()
            }
            CredentialError::Storage(error) => error.into(),
        }
    }
}

impl From<ExpenseError> for HttpError {
    fn from(error: ExpenseError) -> Self {
        match error {
            ExpenseError::AmountOutOfRange => ErrorKind::BadRequest
                .with_message("Amount is out of range")
                .with_context("amount must be less than 100000000 in magnitude with at most 20 decimal places")
                .with_resource("expenses"),
            ExpenseError::Storage(error) => error.into(),
        }
    }
}

impl From<SessionError> for HttpError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Signing(reason) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    reason = %reason,
                    "Session signing failed"
                );
                ErrorKind::InternalServerError.into_error()
            }
            // Verification failures are not told apart.
            SessionError::Malformed | SessionError::BadSignature | SessionError::Expired => {
                ErrorKind::Unauthorized.with_resource("authentication")
            }
        }
    }
}
