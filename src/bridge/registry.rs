//! Broadcast set of open WebSocket connections
//!
//! Each connection owns a bounded queue drained by its writer task. Fan-out
//! uses `try_send`, so a slow client only loses its own frames and never
//! stalls the UDP receiver.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::trace;
use uuid::Uuid;

/// Maximum number of frames buffered per WebSocket connection
pub const WS_BUFFER_SIZE: usize = 256;

pub type ClientId = Uuid;

/// Result of fanning one frame out to every registered client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Clients the frame was queued for
    pub delivered: usize,
    /// Clients whose queue was full
    pub dropped: usize,
    /// Clients already closing; skipped
    pub closed: usize,
}

#[derive(Clone)]
pub struct ConnectionRegistry {
    clients: Arc<DashMap<ClientId, mpsc::Sender<Bytes>>>,
    capacity: usize,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(WS_BUFFER_SIZE)
    }

    /// Create a registry whose per-client queues hold `capacity` frames
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Add a connection to the broadcast set.
    ///
    /// The connection stays registered until the returned guard is dropped.
    pub fn register(&self) -> (ConnectionGuard, mpsc::Receiver<Bytes>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.clients.insert(id, tx);

        let guard = ConnectionGuard {
            id,
            clients: self.clients.clone(),
        };
        (guard, rx)
    }

    /// Queue `frame` for every open connection, continuing past failures
    pub fn broadcast(&self, frame: &Bytes) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        for entry in self.clients.iter() {
            match entry.value().try_send(frame.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    trace!(client = %entry.key(), "Client buffer full, dropping frame");
                    outcome.dropped += 1;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    outcome.closed += 1;
                }
            }
        }

        outcome
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deregisters its connection on drop
pub struct ConnectionGuard {
    id: ClientId,
    clients: Arc<DashMap<ClientId, mpsc::Sender<Bytes>>>,
}

impl ConnectionGuard {
    pub fn id(&self) -> ClientId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.clients.remove(&self.id);
    }
}
