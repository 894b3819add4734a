//! Bridge server
//!
//! Serves the relay WebSocket endpoint plus health and status routes on a
//! single listener.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{AppState, BridgeServer};
