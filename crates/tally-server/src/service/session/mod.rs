//! Stateless session tokens.
//!
//! A session is an HS256-signed JWT naming the user in `sub`. Nothing is
//! stored server-side: a token is valid while its signature checks out and
//! the current time is before `exp`. There is no revocation.

mod claims;
mod codec;

pub use claims::SessionClaims;
pub use codec::{SessionCodec, SessionError, SessionToken};
