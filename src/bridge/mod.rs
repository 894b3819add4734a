//! Relay core
//!
//! - [`UdpRelay`]: the UDP socket, forwarding to the fixed target and
//!   receiving datagrams for broadcast
//! - [`ConnectionRegistry`]: the broadcast set of open WebSocket connections

pub mod registry;
pub mod udp;

pub use registry::{BroadcastOutcome, ClientId, ConnectionGuard, ConnectionRegistry, WS_BUFFER_SIZE};
pub use udp::UdpRelay;
