//! Bridge server using Axum
//!
//! Binds the WebSocket listener and the UDP socket, then serves both until
//! shutdown is signalled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::bridge::{ConnectionRegistry, UdpRelay};
use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::models::BridgeStats;

use super::routes;

/// Shared state for the WebSocket and HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: UdpRelay,
    pub registry: ConnectionRegistry,
    pub stats: Arc<BridgeStats>,
    pub started_at: Instant,
    pub started_at_utc: DateTime<Utc>,
    pub ws_addr: SocketAddr,
    pub udp_addr: SocketAddr,
    pub bidirectional: bool,
}

/// WebSocket <-> UDP bridge with both sockets already bound
pub struct BridgeServer {
    listener: TcpListener,
    state: AppState,
}

impl BridgeServer {
    /// Bind the UDP socket and the WebSocket listener
    pub async fn bind(config: &Config) -> Result<Self> {
        let stats = Arc::new(BridgeStats::new());

        let udp_bind = config.udp_bind_addr();
        let relay = UdpRelay::bind(udp_bind, config.bridge.target.clone(), stats.clone()).await?;

        let ws_bind = config.ws_addr();
        let listener = TcpListener::bind(ws_bind)
            .await
            .map_err(|e| BridgeError::bind(ws_bind, e))?;

        let state = AppState {
            ws_addr: listener.local_addr()?,
            udp_addr: relay.local_addr()?,
            relay,
            registry: ConnectionRegistry::new(),
            stats,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            bidirectional: config.is_bidirectional(),
        };

        Ok(Self { listener, state })
    }

    /// Bound WebSocket address
    pub fn ws_addr(&self) -> SocketAddr {
        self.state.ws_addr
    }

    /// Bound UDP address
    pub fn udp_addr(&self) -> SocketAddr {
        self.state.udp_addr
    }

    pub fn registry(&self) -> ConnectionRegistry {
        self.state.registry.clone()
    }

    pub fn stats(&self) -> Arc<BridgeStats> {
        self.state.stats.clone()
    }

    /// Build the router
    fn build_router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Run the bridge until `shutdown` flips to true
    #[instrument(skip(self, shutdown))]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let router = self.build_router();

        info!("WS-UDP bridge listening on ws://{}", self.state.ws_addr);
        info!("Forwarding to UDP {}", self.state.relay.target());

        let receiver_task = if self.state.bidirectional {
            let relay = self.state.relay.clone();
            let registry = self.state.registry.clone();
            let receiver_shutdown = shutdown.clone();
            Some(tokio::spawn(async move {
                relay.run_receiver(registry, receiver_shutdown).await;
            }))
        } else {
            info!("One-way mode: UDP datagrams are not broadcast");
            None
        };

        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .map_err(|e| BridgeError::Internal(e.to_string()))?;

        if let Some(task) = receiver_task {
            task.abort();
            let _ = task.await;
        }

        info!("Bridge shut down");
        Ok(())
    }
}
