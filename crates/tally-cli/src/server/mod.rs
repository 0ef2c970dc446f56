//! Binds the listener and runs the router until shutdown.

mod shutdown;

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves `app` on the configured address.
///
/// After Ctrl-C or SIGTERM in-flight requests get `SHUTDOWN_TIMEOUT`
/// seconds to finish before the server stops waiting for them.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    let addr = config.server_addr();
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            %addr,
            "Listening on every interface"
        );
    }

    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|error| log_fatal(error, Instant::now()))?;
    tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, %addr, "Accepting connections");

    let started = Instant::now();
    let result = run_until_shutdown(listener, app, &config).await;
    match &result {
        Ok(()) => tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs = started.elapsed().as_secs(),
            "Server stopped"
        ),
        Err(error) => log_fatal(error, started),
    }

    result
}

async fn run_until_shutdown(
    listener: TcpListener,
    app: Router,
    config: &ServerConfig,
) -> io::Result<()> {
    let signalled = Arc::new(Notify::new());
    let graceful = {
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    };

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful)
    .into_future();

    let grace = config.shutdown_timeout();
    let deadline = async {
        signalled.notified().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                grace_secs = grace.as_secs(),
                "Open connections did not drain in time"
            );
            Ok(())
        }
    }
}

fn log_fatal(error: &io::Error, started: Instant) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %error,
        kind = ?error.kind(),
        uptime_secs = started.elapsed().as_secs(),
        hint = hint_for(error),
        "Server failed"
    );
}

fn hint_for(error: &io::Error) -> &'static str {
    match error.kind() {
        io::ErrorKind::AddrInUse => "another process holds this PORT",
        io::ErrorKind::AddrNotAvailable => "HOST is not an address of this machine",
        io::ErrorKind::PermissionDenied => "binding this port needs elevated privileges",
        _ => "none",
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[tokio::test]
    async fn occupied_port_is_reported() -> anyhow::Result<()> {
        let holder = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: holder.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), config).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::AddrInUse);
        Ok(())
    }

    #[test]
    fn hints_cover_bind_failures() {
        assert_ne!(hint_for(&io::Error::from(io::ErrorKind::AddrInUse)), "none");
        assert_eq!(hint_for(&io::Error::other("boom")), "none");
    }
}
