use clap::Args;
use serde::{Deserialize, Serialize};
use tally_server::middleware::{CorsConfig, RecoveryConfig};

use crate::TRACING_TARGET_CONFIG;

/// Settings for the router-wide layers.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[clap(flatten)]
    pub cors: CorsConfig,

    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            cors_origins = ?self.cors.to_header_values(),
            cors_credentials = self.cors.allow_credentials,
            request_timeout_secs = self.recovery.request_timeout,
            "Middleware configuration"
        );
    }
}
