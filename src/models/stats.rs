use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relay counters shared by the WebSocket handlers and the UDP receiver.
///
/// Counters are informational only and never gate forwarding.
#[derive(Debug, Default)]
pub struct BridgeStats {
    ws_to_udp_frames: AtomicU64,
    ws_to_udp_bytes: AtomicU64,
    udp_send_errors: AtomicU64,
    ignored_messages: AtomicU64,
    udp_datagrams: AtomicU64,
    udp_to_ws_frames: AtomicU64,
    udp_to_ws_dropped: AtomicU64,
    connections_total: AtomicU64,
}

impl BridgeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_forwarded(&self, bytes: usize) {
        self.ws_to_udp_frames.fetch_add(1, Ordering::Relaxed);
        self.ws_to_udp_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_send_error(&self) {
        self.udp_send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// One datagram queued for `delivered` clients and discarded for `dropped` full ones
    pub fn record_broadcast(&self, delivered: usize, dropped: usize) {
        self.udp_datagrams.fetch_add(1, Ordering::Relaxed);
        self.udp_to_ws_frames
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.udp_to_ws_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub fn record_connection(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, connected_clients: usize) -> StatsSnapshot {
        StatsSnapshot {
            connected_clients,
            connections_total: self.connections_total.load(Ordering::Relaxed),
            ws_to_udp_frames: self.ws_to_udp_frames.load(Ordering::Relaxed),
            ws_to_udp_bytes: self.ws_to_udp_bytes.load(Ordering::Relaxed),
            udp_send_errors: self.udp_send_errors.load(Ordering::Relaxed),
            ignored_messages: self.ignored_messages.load(Ordering::Relaxed),
            udp_datagrams: self.udp_datagrams.load(Ordering::Relaxed),
            udp_to_ws_frames: self.udp_to_ws_frames.load(Ordering::Relaxed),
            udp_to_ws_dropped: self.udp_to_ws_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BridgeStats`]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Currently open WebSocket connections
    pub connected_clients: usize,
    /// WebSocket connections accepted since startup
    pub connections_total: u64,
    /// Binary frames sent to the UDP target
    pub ws_to_udp_frames: u64,
    pub ws_to_udp_bytes: u64,
    pub udp_send_errors: u64,
    /// Non-binary WebSocket messages skipped
    pub ignored_messages: u64,
    /// Datagrams received on the UDP socket
    pub udp_datagrams: u64,
    /// Binary frames queued to WebSocket clients
    pub udp_to_ws_frames: u64,
    /// Frames discarded because a client queue was full
    pub udp_to_ws_dropped: u64,
}

/// Response body for `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub ws_addr: String,
    pub udp_addr: String,
    pub target: String,
    pub bidirectional: bool,
    pub stats: StatsSnapshot,
}
