//! Response types for HTTP handlers.

mod error_response;
mod expenses;
mod identities;

use serde::Serialize;

pub use error_response::ErrorResponse;
pub use expenses::*;
pub use identities::*;

/// Plain confirmation for operations with nothing else to return.
#[must_use]
#[derive(Debug, Clone, Serialize)]
pub struct Acknowledgement {
    pub message: &'static str,
}

impl Acknowledgement {
    #[inline]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
