//! Password hashing and session signing keys.

mod password_hasher;
mod session_keys;

pub use password_hasher::{HasherError, PasswordHasher};
pub use session_keys::{MIN_SECRET_LEN, SessionKeys};
