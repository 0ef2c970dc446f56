//! Errors raised while assembling the service.
//!
//! Per-request failures use [`handler::Error`] instead.
//!
//! [`handler::Error`]: crate::handler::Error

use std::borrow::Cow;

/// Result type alias for service assembly.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The service could not be assembled from its configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    Config(Cow<'static, str>),
}

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(message.into())
    }
}
