#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::path::Path;
use std::process;

use anyhow::Context;
use axum::Router;
use tally_server::handler::routes;
use tally_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use tally_server::service::store::PgBackend;
use tally_server::service::{ServiceState, Supervisor};
use tower_http::services::ServeDir;

use crate::config::Cli;

pub const TRACING_TARGET_SERVER_STARTUP: &str = "tally_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "tally_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "tally_cli::config";

#[tokio::main]
async fn main() -> process::ExitCode {
    match run().await {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(error) => {
            // Failures before `init_tracing` have no subscriber to go to.
            if tracing::dispatcher::has_been_set() {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = format!("{error:#}"),
                    "Exiting after a fatal error"
                );
            } else {
                eprintln!("tally: {error:#}");
            }
            process::ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli).await?;
    let router = create_router(state, &cli);
    server::serve(router, cli.server).await?;
    Ok(())
}

/// Waits for the database, creates the schema when absent and assembles
/// the service state.
async fn create_service_state(cli: &Cli) -> anyhow::Result<ServiceState> {
    let client = cli
        .postgres
        .clone()
        .build()
        .context("failed to create database client")?;

    let backend = PgBackend::new(client.clone());
    let attempts = Supervisor::new(cli.service.retry_policy())
        .run(&backend)
        .await
        .context("database never became reachable")?;

    tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, attempts, "Database reachable");

    client
        .ensure_schema()
        .await
        .context("failed to create database schema")?;

    ServiceState::from_postgres(client, &cli.service).context("failed to create service state")
}

/// Routes for the configured service kind plus the middleware stack.
///
/// Layers wrap outward in call order, so recovery sees every failure
/// below it.
fn create_router(state: ServiceState, cli: &Cli) -> Router {
    let routes = match cli.static_dir.as_deref() {
        Some(dir) => with_static_files(routes(cli.service_kind), dir),
        None => routes(cli.service_kind),
    };

    routes
        .with_state(state)
        .with_security(&cli.middleware.cors)
        .with_observability()
        .with_recovery(&cli.middleware.recovery)
}

fn with_static_files(router: Router<ServiceState>, dir: &Path) -> Router<ServiceState> {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        dir = %dir.display(),
        "Serving static files under /static"
    );
    router.nest_service("/static", ServeDir::new(dir))
}
