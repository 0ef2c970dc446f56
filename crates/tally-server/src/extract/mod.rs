//! Request extractors.
//!
//! - [`AuthSession`]: the authentication gate, yielding the verified username
//! - [`SessionCookie`]: response part that sets the session cookie
//! - [`Json`] and [`ValidateJson`]: JSON bodies with structured rejections

pub mod reject;
pub mod session;

pub use crate::extract::reject::{Json, ValidateJson};
pub use crate::extract::session::{AuthSession, SESSION_COOKIE, SessionCookie};
