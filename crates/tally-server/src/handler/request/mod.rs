//! Request types for HTTP handlers.

mod expenses;
mod identities;
mod validations;

pub use expenses::*;
pub use identities::*;
pub use validations::*;
