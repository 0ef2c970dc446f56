//! PostgreSQL client with connection pooling and schema bootstrap.

pub(crate) mod custom_hooks;
mod pg_client;
mod pg_config;
mod pg_schema;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use pg_client::{PgClient, PgConn};
pub use pg_config::PgConfig;

/// Snapshot returned by [`PgClient::pool_status`].
pub use deadpool::Status as PgPoolStatus;

/// deadpool pool of async diesel connections.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// A connection checked out of [`ConnectionPool`].
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
