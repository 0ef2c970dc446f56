use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;

use super::bootstrap::RetryPolicy;
use super::security::SessionKeys;
use super::session::SessionCodec;
use crate::Result;

/// Default values for configuration options.
mod defaults {
    /// Default session lifetime: fifteen minutes.
    pub const SESSION_TTL_SECS: u64 = 900;

    /// Default `iss` claim of issued tokens.
    pub const SESSION_ISSUER: &str = "tally";

    /// Default number of storage connection attempts at startup.
    pub const BOOTSTRAP_MAX_ATTEMPTS: u32 = 10;

    /// Default pause between two startup attempts, in seconds.
    pub const BOOTSTRAP_BACKOFF_SECS: u64 = 5;
}

/// App [`state`] configuration.
///
/// The signing secret has no default and must be supplied through
/// `AUTH_SIGNING_SECRET` or `--auth-signing-secret`.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Shared secret used to sign session tokens (at least 32 bytes)
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-signing-secret", env = "AUTH_SIGNING_SECRET", hide_env_values = true)
    )]
    pub auth_signing_secret: String,

    /// Lifetime of a session token in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "session-ttl-secs", env = "SESSION_TTL_SECS", default_value = "900")
    )]
    #[builder(default = "defaults::SESSION_TTL_SECS")]
    pub session_ttl_secs: u64,

    /// Issuer claim written into and required from session tokens
    #[cfg_attr(
        feature = "config",
        arg(long = "session-issuer", env = "SESSION_ISSUER", default_value = "tally")
    )]
    #[builder(default = "defaults::SESSION_ISSUER.to_owned()")]
    pub session_issuer: String,

    /// Storage connection attempts before giving up at startup
    #[cfg_attr(
        feature = "config",
        arg(
            long = "bootstrap-max-attempts",
            env = "BOOTSTRAP_MAX_ATTEMPTS",
            default_value = "10"
        )
    )]
    #[builder(default = "defaults::BOOTSTRAP_MAX_ATTEMPTS")]
    pub bootstrap_max_attempts: u32,

    /// Seconds to wait between startup connection attempts
    #[cfg_attr(
        feature = "config",
        arg(
            long = "bootstrap-backoff-secs",
            env = "BOOTSTRAP_BACKOFF_SECS",
            default_value = "5"
        )
    )]
    #[builder(default = "defaults::BOOTSTRAP_BACKOFF_SECS")]
    pub bootstrap_backoff_secs: u64,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Returns the session lifetime.
    #[inline]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Returns the startup retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.bootstrap_max_attempts,
            Duration::from_secs(self.bootstrap_backoff_secs),
        )
    }

    /// Derives the session signing keys from the configured secret.
    pub fn load_session_keys(&self) -> Result<SessionKeys> {
        SessionKeys::from_secret(&self.auth_signing_secret)
    }

    /// Builds the session codec.
    pub fn session_codec(&self) -> Result<SessionCodec> {
        let keys = self.load_session_keys()?;
        Ok(SessionCodec::new(
            keys,
            self.session_issuer.clone(),
            self.session_ttl(),
        ))
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("auth_signing_secret", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("session_issuer", &self.session_issuer)
            .field("bootstrap_max_attempts", &self.bootstrap_max_attempts)
            .field("bootstrap_backoff_secs", &self.bootstrap_backoff_secs)
            .finish()
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(ttl) = builder.session_ttl_secs
            && ttl == 0
        {
            return Err("session ttl must be greater than zero".into());
        }

        if let Some(issuer) = &builder.session_issuer
            && issuer.trim().is_empty()
        {
            return Err("session issuer must not be empty".into());
        }

        if let Some(attempts) = builder.bootstrap_max_attempts
            && attempts == 0
        {
            return Err("bootstrap max attempts must be at least 1".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn builder_applies_defaults() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_signing_secret(SECRET)
            .build()?;

        assert_eq!(config.session_ttl(), Duration::from_secs(900));
        assert_eq!(config.session_issuer, "tally");
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        Ok(())
    }

    #[test]
    fn builder_requires_secret() {
        assert!(ServiceConfig::builder().build().is_err());
    }

    #[test]
    fn builder_rejects_zero_ttl() {
        let result = ServiceConfig::builder()
            .with_auth_signing_secret(SECRET)
            .with_session_ttl_secs(0u64)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn short_secret_fails_at_key_derivation() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_signing_secret("short")
            .build()?;

        assert!(config.session_codec().is_err());
        Ok(())
    }

    #[test]
    fn debug_hides_secret() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_signing_secret(SECRET)
            .build()?;

        assert!(!format!("{config:?}").contains(SECRET));
        Ok(())
    }
}
