//! UDP side of the bridge
//!
//! One socket serves both directions: frames from WebSocket clients are sent
//! to the fixed target, and datagrams arriving on the bound port are handed
//! to the connection registry for broadcast.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, instrument, trace};

use crate::bridge::registry::ConnectionRegistry;
use crate::config::UdpTarget;
use crate::error::{BridgeError, Result};
use crate::models::BridgeStats;

/// Largest possible UDP payload
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

#[derive(Clone)]
pub struct UdpRelay {
    socket: Arc<UdpSocket>,
    target: UdpTarget,
    stats: Arc<BridgeStats>,
}

impl UdpRelay {
    /// Bind the bridge's UDP socket
    pub async fn bind(addr: SocketAddr, target: UdpTarget, stats: Arc<BridgeStats>) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| BridgeError::bind(addr, e))?;

        Ok(Self {
            socket: Arc::new(socket),
            target,
            stats,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn target(&self) -> &UdpTarget {
        &self.target
    }

    /// Send one frame to the target as a single datagram. No retry.
    pub async fn forward(&self, frame: &[u8]) -> Result<usize> {
        match self
            .socket
            .send_to(frame, self.target.as_socket_target())
            .await
        {
            Ok(sent) => {
                trace!(bytes = sent, target = %self.target, "Forwarded frame to UDP");
                self.stats.record_forwarded(sent);
                Ok(sent)
            }
            Err(e) => {
                self.stats.record_send_error();
                Err(BridgeError::UdpSend {
                    target: self.target.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Receive datagrams and broadcast each one to every open WebSocket.
    ///
    /// Every datagram is fully fanned out before the next one is read.
    #[instrument(skip_all)]
    pub async fn run_receiver(&self, registry: ConnectionRegistry, mut shutdown: watch::Receiver<bool>) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        info!(
            "UDP receiver listening on {}",
            self.socket
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".into())
        );

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, from)) => {
                            let frame = Bytes::copy_from_slice(&buf[..len]);
                            let outcome = registry.broadcast(&frame);
                            self.stats.record_broadcast(outcome.delivered, outcome.dropped);
                            trace!(
                                bytes = len,
                                %from,
                                delivered = outcome.delivered,
                                dropped = outcome.dropped,
                                "Broadcast UDP datagram"
                            );
                        }
                        Err(e) => {
                            // ICMP errors from earlier sends surface here on some platforms
                            debug!("UDP receive error: {}", e);
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("UDP receiver shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn loopback_target() -> (UdpSocket, UdpTarget) {
        let sink = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = sink.local_addr().unwrap().port();
        let target = UdpTarget {
            host: "127.0.0.1".to_string(),
            port,
        };
        (sink, target)
    }

    #[tokio::test]
    async fn test_forward_sends_exact_bytes() {
        let (sink, target) = loopback_target().await;
        let stats = Arc::new(BridgeStats::new());
        let relay = UdpRelay::bind("127.0.0.1:0".parse().unwrap(), target, stats.clone())
            .await
            .unwrap();

        let payload = [0x01, 0x02, 0x03, 0x04];
        let sent = tokio_test::assert_ok!(relay.forward(&payload).await);
        assert_eq!(sent, 4);

        let mut buf = [0u8; 64];
        let (n, from) = timeout(Duration::from_secs(2), sink.recv_from(&mut buf))
            .await
            .expect("datagram not received")
            .unwrap();
        assert_eq!(&buf[..n], &payload);
        assert_eq!(from, relay.local_addr().unwrap());
        assert_eq!(stats.snapshot(0).ws_to_udp_frames, 1);
    }

    #[tokio::test]
    async fn test_receiver_broadcasts_and_stops_on_shutdown() {
        let (_sink, target) = loopback_target().await;
        let stats = Arc::new(BridgeStats::new());
        let relay = UdpRelay::bind("127.0.0.1:0".parse().unwrap(), target, stats.clone())
            .await
            .unwrap();
        let relay_addr = relay.local_addr().unwrap();

        let registry = ConnectionRegistry::new();
        let (_guard, mut rx) = registry.register();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let receiver = {
            let relay = relay.clone();
            let registry = registry.clone();
            tokio::spawn(async move { relay.run_receiver(registry, shutdown_rx).await })
        };

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&[0xAA, 0xBB], relay_addr).await.unwrap();

        let frame = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("frame not broadcast")
            .unwrap();
        assert_eq!(frame.as_ref(), &[0xAA, 0xBB]);
        assert_eq!(stats.snapshot(1).udp_datagrams, 1);

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(2), receiver)
            .await
            .expect("receiver did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_fails_without_poisoning_socket() {
        let (sink, target) = loopback_target().await;
        let stats = Arc::new(BridgeStats::new());
        let relay = UdpRelay::bind("127.0.0.1:0".parse().unwrap(), target, stats.clone())
            .await
            .unwrap();

        let err = relay.forward(&vec![0u8; 70_000]).await.unwrap_err();
        assert!(matches!(err, BridgeError::UdpSend { .. }));

        tokio_test::assert_ok!(relay.forward(&[0x01, 0x02]).await);
        let mut buf = [0u8; 64];
        let n = timeout(Duration::from_secs(2), sink.recv(&mut buf))
            .await
            .expect("datagram not received")
            .unwrap();
        assert_eq!(&buf[..n], &[0x01, 0x02]);

        let snapshot = stats.snapshot(0);
        assert_eq!(snapshot.udp_send_errors, 1);
        assert_eq!(snapshot.ws_to_udp_frames, 1);
    }
}
