#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Pool construction and health checks.
pub const TRACING_TARGET_CLIENT: &str = "tally_postgres::client";

/// Individual queries.
pub const TRACING_TARGET_QUERY: &str = "tally_postgres::queries";

/// `CREATE TABLE IF NOT EXISTS` bootstrap.
pub const TRACING_TARGET_SCHEMA: &str = "tally_postgres::schema";

/// Connection setup and recycling hooks.
pub const TRACING_TARGET_CONNECTION: &str = "tally_postgres::connection";

mod client;
mod error;
pub mod model;
pub mod query;
mod schema;

pub use deadpool::managed::TimeoutType;
pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{ConnectionPool, PgClient, PgConfig, PgConn, PgPoolStatus, PooledConnection};
pub use crate::error::{PgError, PgResult};
