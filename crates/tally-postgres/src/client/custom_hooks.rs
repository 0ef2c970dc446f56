//! Connection lifecycle hooks installed on the pool.

use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::PgConfig;
use crate::TRACING_TARGET_CONNECTION;

/// Opens a connection, logging the outcome with the password masked.
///
/// Installed as [`ManagerConfig::custom_setup`].
///
/// [`ManagerConfig::custom_setup`]: diesel_async::pooled_connection::ManagerConfig
pub fn establish<C>(url: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    async move {
        let started = Instant::now();
        let result = C::establish(url).await;
        let elapsed_ms = started.elapsed().as_millis();
        let url = PgConfig::mask_url(url);

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                %url,
                elapsed_ms,
                error = %error,
                "Could not open database connection"
            );
        } else {
            tracing::debug!(target: TRACING_TARGET_CONNECTION, %url, elapsed_ms, "Database connection opened");
        }

        result
    }
    .boxed()
}

pub fn on_created(_: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::trace!(target: TRACING_TARGET_CONNECTION, created = ?metrics.created, "Connection pooled");
    Ok(())
}

pub fn on_recycled(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            recycled = metrics.recycle_count,
            "Recycled connection is broken"
        );
    }
    Ok(())
}
