//! WS-UDP Bridge - Entry Point
//!
//! Relays binary WebSocket frames to a UDP target and broadcasts UDP
//! datagrams back to every connected WebSocket client.

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use ws_udp_bridge::config::{exit_with_usage, parse_args_or_exit, BridgeCli, BRIDGE_USAGE};
use ws_udp_bridge::{logging, BridgeServer, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration errors exit with status 1 before any socket is opened
    let cli: BridgeCli = parse_args_or_exit(BRIDGE_USAGE);
    let config = Config::from_cli(&cli).unwrap_or_else(|e| exit_with_usage(&e, BRIDGE_USAGE));

    logging::init_tracing(&config.log)?;
    info!("Starting WS-UDP bridge");

    let server = BridgeServer::bind(&config)
        .await
        .context("failed to bind bridge sockets")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server_task = tokio::spawn(async move { server.run(shutdown_rx).await });

    tokio::select! {
        result = &mut server_task => {
            result.context("bridge task failed")??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    server_task.await.context("bridge task failed")??;

    info!("WS-UDP bridge stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
