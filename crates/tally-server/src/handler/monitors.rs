//! Readiness probe.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;

use crate::handler::{ErrorKind, Result};
use crate::service::{HealthProbe, ServiceState};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "tally_server::handler::monitors";

/// Pings storage on every call; answers `Ready` or `503`.
#[tracing::instrument(skip_all)]
async fn readiness(State(health): State<HealthProbe>) -> Result<(StatusCode, &'static str)> {
    if health.is_ready().await {
        tracing::trace!(target: TRACING_TARGET, "Ready");
        return Ok((StatusCode::OK, "Ready"));
    }

    Err(ErrorKind::ServiceUnavailable
        .with_message("Database not ready")
        .with_resource("readiness"))
}

/// Returns a [`Router`] with the readiness route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/readiness", get(readiness))
}
