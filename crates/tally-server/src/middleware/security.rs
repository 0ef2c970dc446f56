//! CORS and baseline response headers.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderName, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Largest request body the API reads, in bytes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Used as the allow-list when `CORS_ORIGINS` is empty.
const DEVELOPMENT_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

/// Cross-origin settings for browser clients.
///
/// Credentialed requests are on by default so the session cookie is sent
/// along with cross-origin calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// Comma separated origin allow-list
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Seconds a browser may cache a preflight answer
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value_t = 3600)
    )]
    pub max_age_seconds: u64,

    /// Sends `Access-Control-Allow-Credentials: true`
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value_t = true, action = clap::ArgAction::Set)
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    #[inline]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Parses the allow-list into header values.
    ///
    /// Entries that are not valid header values are dropped. An empty list
    /// yields [`DEVELOPMENT_ORIGINS`].
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        match self.allowed_origins.as_slice() {
            [] => DEVELOPMENT_ORIGINS.map(HeaderValue::from_static).to_vec(),
            origins => origins
                .iter()
                .filter_map(|origin| HeaderValue::try_from(origin.as_str()).ok())
                .collect(),
        }
    }

    fn layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.to_header_values())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(self.allow_credentials)
            .max_age(self.max_age())
    }
}

/// Extension trait for `axum::`[`Router`] adding CORS, a body limit and
/// hardening headers.
pub trait RouterSecurityExt<S> {
    fn with_security(self, cors: &CorsConfig) -> Self;

    /// [`with_security`](Self::with_security) with [`CorsConfig::default`].
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig) -> Self {
        self.layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(cors.layer())
            .layer(fixed_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .layer(fixed_header(header::X_FRAME_OPTIONS, "DENY"))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default())
    }
}

fn fixed_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
