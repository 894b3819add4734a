//! Command-line configuration for the bridge and the tone utility
//!
//! Every flag has an environment-variable fallback so the bridge can be run
//! from a service manager without a wrapper script.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use clap::Parser;

use crate::error::{BridgeError, Result};

/// Usage line printed on configuration errors
pub const BRIDGE_USAGE: &str =
    "Usage: ws-udp-bridge --port 8080 --target 192.168.1.50:3333 [--listen 3334] [--one-way]";

/// Usage line printed by the tone utility on configuration errors
pub const TONE_USAGE: &str =
    "Usage: udp-tone --target 192.168.1.50:3333 [--duration 5] [--freq 440] [--framed]";

pub const DEFAULT_TARGET: &str = "192.168.1.50:3333";

/// Raw bridge arguments as parsed by clap
#[derive(Parser, Debug, Clone)]
#[command(name = "ws-udp-bridge", about = "Relay binary frames between WebSocket clients and a UDP peer")]
pub struct BridgeCli {
    /// WebSocket listen port
    #[arg(long, env = "BRIDGE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind the WebSocket listener and the UDP socket to
    #[arg(long, env = "BRIDGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// UDP destination as host:port
    #[arg(long, env = "BRIDGE_TARGET", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Local UDP port to receive datagrams for WebSocket broadcast
    #[arg(long, env = "BRIDGE_LISTEN", default_value_t = 3334)]
    pub listen: u16,

    /// Forward WebSocket -> UDP only; do not broadcast UDP datagrams
    #[arg(long, env = "BRIDGE_ONE_WAY", default_value_t = false)]
    pub one_way: bool,

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Raw tone utility arguments as parsed by clap
#[derive(Parser, Debug, Clone)]
#[command(name = "udp-tone", about = "Send a synthetic PCM sine tone over UDP")]
pub struct ToneCli {
    /// UDP destination as host:port
    #[arg(long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Tone length in seconds
    #[arg(long, default_value_t = 5.0)]
    pub duration: f64,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    pub freq: f64,

    /// Wrap frames in AUD0 packets bracketed by STRT/STOP
    #[arg(long, default_value_t = false)]
    pub framed: bool,

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Report a configuration error with the usage line and exit with status 1
pub fn exit_with_usage(err: &dyn fmt::Display, usage: &str) -> ! {
    eprintln!("error: {}", err);
    eprintln!("{}", usage);
    std::process::exit(1)
}

/// Parse arguments for `P`, mapping every parse failure except help/version to exit status 1
pub fn parse_args_or_exit<P: Parser>(usage: &str) -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            // clap's rendered error already carries the "error:" prefix
            eprint!("{}", e);
            eprintln!("{}", usage);
            std::process::exit(1)
        }
    }
}

/// A fixed UDP destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpTarget {
    pub host: String,
    pub port: u16,
}

impl UdpTarget {
    /// Borrowed form accepted by `UdpSocket::send_to`
    pub fn as_socket_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for UdpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for UdpTarget {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_target(s)
    }
}

/// Parse a `host:port` destination. IPv6 literals must be bracketed.
pub fn parse_target(raw: &str) -> Result<UdpTarget> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BridgeError::invalid_target(raw, "host is required"));
    }

    let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
        let (host, port) = rest
            .split_once("]:")
            .ok_or_else(|| BridgeError::invalid_target(raw, "missing port"))?;
        (host, port)
    } else {
        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| BridgeError::invalid_target(raw, "missing port"))?;
        if host.contains(':') {
            return Err(BridgeError::invalid_target(
                raw,
                "IPv6 hosts must be written as [addr]:port",
            ));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(BridgeError::invalid_target(raw, "host is required"));
    }
    if port.is_empty() {
        return Err(BridgeError::invalid_target(raw, "missing port"));
    }
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::invalid_target(raw, "port must be numeric"));
    }

    let port: u16 = port
        .parse()
        .map_err(|_| BridgeError::invalid_target(raw, "port must be between 1 and 65535"))?;
    if port == 0 {
        return Err(BridgeError::invalid_target(
            raw,
            "port must be between 1 and 65535",
        ));
    }

    Ok(UdpTarget {
        host: host.to_string(),
        port,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(BridgeError::InvalidConfig(format!(
                "unsupported log format: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive (debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl LogConfig {
    fn from_args(level: &str, format: &str) -> Result<Self> {
        let level = level.trim();
        if level.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "log level must not be empty".into(),
            ));
        }
        Ok(LogConfig {
            level: level.to_string(),
            format: format.parse()?,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bind address for both transports
    pub host: IpAddr,
    /// WebSocket listen port (0 picks an ephemeral port)
    pub port: u16,
    /// Fixed UDP destination for WebSocket frames
    pub target: UdpTarget,
    /// UDP receive port for the reverse path; `None` in one-way mode
    pub listen_port: Option<u16>,
}

/// Validated bridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub log: LogConfig,
}

impl Config {
    /// Validate parsed arguments. No socket is touched here.
    pub fn from_cli(cli: &BridgeCli) -> Result<Self> {
        let host: IpAddr = cli.host.trim().parse().map_err(|_| {
            BridgeError::InvalidConfig(format!(
                "--host must be an IP address, got '{}'",
                cli.host
            ))
        })?;

        let target = parse_target(&cli.target)?;

        // One socket sends and receives, so an IP-literal target must share its family
        if let Ok(target_ip) = target.host.parse::<IpAddr>() {
            if target_ip.is_ipv4() != host.is_ipv4() {
                return Err(BridgeError::InvalidConfig(format!(
                    "--target {} and --host {} are different address families",
                    target, host
                )));
            }
        }

        Ok(Config {
            bridge: BridgeConfig {
                host,
                port: cli.port,
                target,
                listen_port: if cli.one_way { None } else { Some(cli.listen) },
            },
            log: LogConfig::from_args(&cli.log_level, &cli.log_format)?,
        })
    }

    /// WebSocket listener address
    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bridge.host, self.bridge.port)
    }

    /// UDP socket address; ephemeral in one-way mode
    pub fn udp_bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bridge.host, self.bridge.listen_port.unwrap_or(0))
    }

    /// Whether datagrams received on the UDP socket are broadcast
    pub fn is_bidirectional(&self) -> bool {
        self.bridge.listen_port.is_some()
    }
}

/// Validated tone utility configuration
#[derive(Debug, Clone)]
pub struct ToneConfig {
    pub target: UdpTarget,
    pub duration_secs: f64,
    pub freq_hz: f64,
    pub framed: bool,
    pub log: LogConfig,
}

impl ToneConfig {
    pub fn from_cli(cli: &ToneCli) -> Result<Self> {
        if !cli.duration.is_finite() || cli.duration < 0.0 {
            return Err(BridgeError::InvalidConfig(
                "--duration must be a non-negative number of seconds".into(),
            ));
        }
        if !cli.freq.is_finite() || cli.freq < 0.0 {
            return Err(BridgeError::InvalidConfig(
                "--freq must be a non-negative frequency in Hz".into(),
            ));
        }

        Ok(ToneConfig {
            target: parse_target(&cli.target)?,
            duration_secs: cli.duration,
            freq_hz: cli.freq,
            framed: cli.framed,
            log: LogConfig::from_args(&cli.log_level, &cli.log_format)?,
        })
    }
}
