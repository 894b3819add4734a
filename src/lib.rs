//! WS-UDP Bridge
//!
//! Relays binary frames between WebSocket clients and a fixed UDP peer.
//!
//! ## Features
//!
//! - WebSocket binary messages forwarded verbatim as UDP datagrams
//! - UDP datagrams broadcast verbatim to every open WebSocket connection
//! - Bounded per-client queues so one slow client cannot stall the relay
//! - Health and status endpoints on the WebSocket listener
//! - `udp-tone` companion utility for testing UDP audio receivers

pub mod api;
pub mod audio;
pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod tone;

pub use api::BridgeServer;
pub use config::Config;
pub use error::{BridgeError, Result};
