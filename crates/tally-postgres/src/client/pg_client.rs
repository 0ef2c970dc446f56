//! Pooled client handed to every storage consumer.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::{Runtime, Status as PgPoolStatus};
use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::{ConnectionPool, custom_hooks};
use crate::{PgConfig, PgError, PgResult, PooledConnection, TRACING_TARGET_CLIENT};

/// Checkouts slower than this are logged.
const SLOW_CHECKOUT: Duration = Duration::from_millis(100);

/// Shared handle to the connection pool.
///
/// Clones point at the same pool. Construct one at startup and pass it
/// down; there is no global instance.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<ClientState>,
}

struct ClientState {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Builds the pool without opening a connection.
    ///
    /// Use [`PgClient::ping`] to find out whether the database answers.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(database_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::establish);
        let manager =
            AsyncDieselConnectionManager::new_with_config(config.database_url(), manager_config);

        let timeout = Some(config.connection_timeout());
        let pool = Pool::builder(manager)
            .runtime(Runtime::Tokio1)
            .max_size(config.postgres_max_connections as usize)
            .create_timeout(timeout)
            .wait_timeout(timeout)
            .recycle_timeout(config.idle_timeout())
            .post_create(Hook::sync_fn(custom_hooks::on_created))
            .post_recycle(Hook::sync_fn(custom_hooks::on_recycled))
            .build()
            .map_err(|error| PgError::Unexpected(format!("invalid pool settings: {error}").into()))?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            max_connections = config.postgres_max_connections,
            "Database client created"
        );

        Ok(Self {
            inner: Arc::new(ClientState { pool, config }),
        })
    }

    /// Checks a connection out of the pool, waiting at most the configured
    /// connection timeout.
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let started = Instant::now();
        let result = self.inner.pool.get().await;
        let waited = started.elapsed();

        match result {
            Ok(conn) => {
                if waited > SLOW_CHECKOUT {
                    tracing::warn!(target: TRACING_TARGET_CLIENT, ?waited, "Slow connection checkout");
                }
                Ok(PgConn { conn })
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    error = %error,
                    ?waited,
                    "Connection checkout failed"
                );
                Err(error.into())
            }
        }
    }

    /// Runs `SELECT 1` on a fresh checkout. Never cached.
    pub async fn ping(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        diesel::sql_query("SELECT 1").execute(&mut **conn).await?;
        Ok(())
    }

    /// Pool occupancy: size, idle connections and waiting callers.
    #[inline]
    pub fn pool_status(&self) -> PgPoolStatus {
        self.inner.pool.status()
    }

    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.pool_status();
        f.debug_struct("PgClient")
            .field("database_url", &self.inner.config.database_url_masked())
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

/// Connection checked out of a [`PgClient`].
///
/// The query traits are implemented on the inner connection and reached
/// through [`Deref`]. Dropping returns the connection to the pool.
///
/// ```ignore
/// let mut conn = client.get_connection().await?;
/// let user = conn.find_user_by_username("alice").await?;
/// ```
#[derive(Deref, DerefMut)]
pub struct PgConn {
    conn: PooledConnection,
}

impl PgConn {
    /// Runs `f` inside a transaction: committed on `Ok`, rolled back on `Err`.
    ///
    /// ```ignore
    /// conn.transaction(|conn| {
    ///     Box::pin(async move {
    ///         conn.delete_expenses_of("alice").await?;
    ///         conn.delete_user("alice").await
    ///     })
    /// })
    /// .await?;
    /// ```
    pub async fn transaction<'a, T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut PooledConnection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        T: Send + 'a,
        E: From<diesel::result::Error> + Send + 'a,
    {
        self.conn.transaction(f).await
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
