use std::net::SocketAddr;

use thiserror::Error;

/// Unified error type for the bridge and the tone utility
#[derive(Error, Debug)]
pub enum BridgeError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid UDP target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    // Transport errors
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("UDP send to {target} failed: {source}")]
    UdpSend {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid socket address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    // Framing errors
    #[error("Audio payload of {len} bytes exceeds the packet limit")]
    PayloadTooLarge { len: usize },

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        BridgeError::Bind {
            addr: addr.to_string(),
            source,
        }
    }

    /// Configuration errors are reported with a usage string and exit code 1
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidConfig(_)
                | BridgeError::InvalidTarget { .. }
                | BridgeError::InvalidAddress(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_classification() {
        assert!(BridgeError::InvalidConfig("bad".to_string()).is_config_error());
        assert!(BridgeError::invalid_target("host", "missing port").is_config_error());

        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        assert!(!BridgeError::bind("127.0.0.1:8080".parse().unwrap(), io).is_config_error());
        assert!(!BridgeError::PayloadTooLarge { len: 70_000 }.is_config_error());
    }

    #[test]
    fn test_error_messages() {
        let err = BridgeError::invalid_target("10.0.0.1:abc", "port must be numeric");
        assert_eq!(
            err.to_string(),
            "Invalid UDP target '10.0.0.1:abc': port must be numeric"
        );

        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err = BridgeError::bind("0.0.0.0:3334".parse().unwrap(), io);
        assert_eq!(err.to_string(), "Failed to bind 0.0.0.0:3334: in use");
    }
}
