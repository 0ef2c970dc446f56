//! Cookie-carried sessions.
//!
//! [`AuthSession`] is the request gate: it reads the session cookie and
//! verifies it with the [`SessionCodec`]. [`SessionCookie`] writes the
//! cookie after a successful login.
//!
//! [`SessionCodec`]: crate::service::SessionCodec

mod auth_session;
mod session_cookie;

pub use self::auth_session::AuthSession;
pub use self::session_cookie::SessionCookie;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";
