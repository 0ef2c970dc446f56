//! First-boot schema creation.
//!
//! Tables are created when absent and never altered afterwards.

use diesel_async::RunQueryDsl;

use crate::{PgClient, PgResult, TRACING_TARGET_SCHEMA};

/// Statements executed in order by [`PgClient::ensure_schema`].
pub(crate) const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL UNIQUE,
        email VARCHAR(100),
        password_hash VARCHAR(255) NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS expenses (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL,
        description TEXT NOT NULL,
        amount NUMERIC(10, 2) NOT NULL,
        date TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS expenses_username_idx ON expenses (username)",
];

impl PgClient {
    /// Creates the `users` and `expenses` tables if they do not exist yet.
    ///
    /// Safe to call on every start.
    pub async fn ensure_schema(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;

        for statement in SCHEMA_STATEMENTS {
            diesel::sql_query(*statement).execute(&mut **conn).await?;
        }

        tracing::info!(
            target: TRACING_TARGET_SCHEMA,
            statements = SCHEMA_STATEMENTS.len(),
            "Database schema ensured"
        );

        Ok(())
    }
}
