//! Command-line and environment configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, request timeout
//! ├── service: ServiceConfig        # Signing secret, sessions, bootstrap
//! └── postgres: PgConfig            # Connection string and pool
//! ```
//!
//! Every option has a matching environment variable; `tally --help` lists
//! them.

mod middleware;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tally_postgres::PgConfig;
use tally_server::handler::ServiceKind;
use tally_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Output format of log records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tally")]
#[command(about = "Tally expense tracker server")]
#[command(version)]
pub struct Cli {
    /// Which route groups this process serves.
    #[arg(long, env = "SERVICE_KIND", value_enum, default_value_t = ServiceKind::Combined)]
    pub service_kind: ServiceKind,

    /// Directory served as static files under `/static`.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Log record format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Session and startup configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Database connection configuration.
    #[clap(flatten)]
    pub postgres: PgConfig,
}

impl Cli {
    /// Parses arguments after reading `./.env` when the `dotenv` feature
    /// is on. Variables already set in the process win over the file.
    pub fn init() -> Self {
        #[cfg(feature = "dotenv")]
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            // Tracing is not set up yet.
            eprintln!("tally: ignoring unreadable .env file: {error}");
        }

        Self::parse()
    }

    /// Installs the global subscriber. `RUST_LOG` overrides the `info`
    /// default.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt = tracing_subscriber::fmt::layer();
        let registry = tracing_subscriber::registry().with(filter);

        if self.log_format == LogFormat::Json {
            registry.with(fmt.json()).init();
        } else {
            registry.with(fmt).init();
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.postgres
            .validate()
            .context("invalid database configuration")?;
        Ok(())
    }

    /// Logs configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            service_kind = %self.service_kind,
            static_dir = ?self.static_dir,
            session_ttl_secs = self.service.session_ttl_secs,
            bootstrap_max_attempts = self.service.bootstrap_max_attempts,
            bootstrap_backoff_secs = self.service.bootstrap_backoff_secs,
            "Service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_url = %self.postgres.database_url_masked(),
            postgres_max_connections = self.postgres.postgres_max_connections,
            postgres_connection_timeout_secs = self.postgres.postgres_connection_timeout_secs,
            "Database configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
