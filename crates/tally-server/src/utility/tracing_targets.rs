//! Tracing targets, one per concern, so `RUST_LOG` can single one out,
//! e.g. `tally_server::authentication=debug`.

/// Session cookie extraction and verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "tally_server::authentication";

/// Password hashing and verification operations.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "tally_server::password_hasher";

/// Session token issuance and verification.
pub const TRACING_TARGET_SESSION: &str = "tally_server::session";

/// Credential store operations.
pub const TRACING_TARGET_CREDENTIALS: &str = "tally_server::credentials";

/// Owner-scoped expense store operations.
pub const TRACING_TARGET_EXPENSES: &str = "tally_server::expenses";

/// Storage backend operations.
pub const TRACING_TARGET_STORE: &str = "tally_server::store";

/// Per-request spans.
pub const TRACING_TARGET_HTTP: &str = "tally_server::http";

/// Startup connection supervision.
pub const TRACING_TARGET_BOOTSTRAP: &str = "tally_server::bootstrap";

/// Error recovery including middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "tally_server::recovery::error";

/// Panic recovery including handler panics.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "tally_server::recovery::panic";
