//! WebSocket handlers
//!
//! Outbound frames use the registry's bounded per-connection queues; see
//! [`crate::bridge::registry`].

pub mod relay;
