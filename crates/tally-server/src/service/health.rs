//! On-demand storage health checks.

use std::sync::Arc;

use super::store::StorageProbe;
use crate::utility::tracing_targets::TRACING_TARGET_STORE as TRACING_TARGET;

/// Live readiness check over a [`StorageProbe`].
///
/// Every call performs a fresh round trip; results are not cached.
#[derive(Clone)]
pub struct HealthProbe {
    probe: Arc<dyn StorageProbe>,
}

impl HealthProbe {
    /// Creates a new health probe.
    pub fn new(probe: Arc<dyn StorageProbe>) -> Self {
        Self { probe }
    }

    /// Returns `true` if storage answered a ping.
    pub async fn is_ready(&self) -> bool {
        match self.probe.ping().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Readiness check failed"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for HealthProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProbe").finish_non_exhaustive()
    }
}
