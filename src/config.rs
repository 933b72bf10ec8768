//! Connection grammar and session settings
//!
//! A session is described by one connection string:
//!
//! ```text
//! "5000"                   listening mode, UDP data port only
//! "224.0.1.0:5000"         multicast listening mode
//! "atc-301422002:5000"     communicating mode (controller known, TCP opened)
//! "192.168.0.1:5000"       communicating mode with literal IP
//! "192.168.0.1:5000:fw"    listening mode behind a stateful firewall
//! ```
//!
//! Timeouts and the receive buffer size live in [`Settings`], which can
//! also be loaded from a TOML file:
//!
//! ```toml
//! data_timeout_us = 1000000
//! command_timeout_us = 10000000
//! data_buffer_size = 32768
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default UDP receive timeout (1 s)
pub const DEFAULT_DATA_TIMEOUT_US: u64 = 1_000_000;

/// Default TCP command timeout (10 s)
pub const DEFAULT_COMMAND_TIMEOUT_US: u64 = 10_000_000;

/// Default UDP receive buffer size (32 KiB)
pub const DEFAULT_DATA_BUFFER_SIZE: usize = 32_768;

/// How a session reaches its controller, parsed from the connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// Receive measurement data only; the controller stays unknown
    Listen { port: u16 },
    /// Receive measurement data from a multicast group
    Multicast { group: Ipv4Addr, port: u16 },
    /// Controller known: open the TCP command session
    Controller { host: String, port: u16 },
    /// Controller known, but listening only: no TCP, prime the firewall
    ControllerFw { host: String, port: u16 },
}

impl Connection {
    /// Host of the controller, if the mode knows one
    pub fn controller_host(&self) -> Option<&str> {
        match self {
            Connection::Controller { host, .. } | Connection::ControllerFw { host, .. } => {
                Some(host)
            }
            _ => None,
        }
    }

    /// Local UDP data port of the mode
    pub fn data_port(&self) -> u16 {
        match self {
            Connection::Listen { port }
            | Connection::Multicast { port, .. }
            | Connection::Controller { port, .. }
            | Connection::ControllerFw { port, .. } => *port,
        }
    }
}

impl FromStr for Connection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [port] => Ok(Connection::Listen {
                port: parse_port(port)?,
            }),
            [host, port] => {
                let port = parse_port(port)?;
                if let Ok(ip) = host.parse::<Ipv4Addr>() {
                    if ip.is_multicast() {
                        return Ok(Connection::Multicast { group: ip, port });
                    }
                }
                Ok(Connection::Controller {
                    host: (*host).to_string(),
                    port,
                })
            }
            [host, port, suffix] => {
                if *suffix != "fw" {
                    return Err(Error::Connection(format!(
                        "unknown suffix {:?}, expected \"fw\"",
                        suffix
                    )));
                }
                Ok(Connection::ControllerFw {
                    host: (*host).to_string(),
                    port: parse_port(port)?,
                })
            }
            _ => Err(Error::Connection(format!("invalid connection string {:?}", s))),
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Listen { port } => write!(f, "{}", port),
            Connection::Multicast { group, port } => write!(f, "{}:{}", group, port),
            Connection::Controller { host, port } => write!(f, "{}:{}", host, port),
            Connection::ControllerFw { host, port } => write!(f, "{}:{}:fw", host, port),
        }
    }
}

fn parse_port(s: &str) -> Result<u16> {
    s.parse::<u16>()
        .map_err(|_| Error::Connection(format!("invalid port {:?}", s)))
}

/// Session timeouts and buffer sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// UDP receive timeout in microseconds
    #[serde(default = "default_data_timeout_us")]
    pub data_timeout_us: u64,

    /// TCP command timeout in microseconds
    #[serde(default = "default_command_timeout_us")]
    pub command_timeout_us: u64,

    /// UDP receive buffer size in bytes; must accommodate the largest
    /// datagram the controller emits
    #[serde(default = "default_data_buffer_size")]
    pub data_buffer_size: usize,
}

fn default_data_timeout_us() -> u64 {
    DEFAULT_DATA_TIMEOUT_US
}

fn default_command_timeout_us() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_US
}

fn default_data_buffer_size() -> usize {
    DEFAULT_DATA_BUFFER_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_timeout_us: DEFAULT_DATA_TIMEOUT_US,
            command_timeout_us: DEFAULT_COMMAND_TIMEOUT_US,
            data_buffer_size: DEFAULT_DATA_BUFFER_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Settings(format!("failed to read settings file: {}", e)))?;
        basic_toml::from_str(&content)
            .map_err(|e| Error::Settings(format!("failed to parse settings file: {}", e)))
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_micros(self.data_timeout_us)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_micros(self.command_timeout_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_listen_mode() {
        let conn: Connection = "5000".parse().unwrap();
        assert_eq!(conn, Connection::Listen { port: 5000 });
        assert_eq!(conn.controller_host(), None);
    }

    #[test]
    fn test_multicast_mode() {
        let conn: Connection = "224.0.1.0:5000".parse().unwrap();
        assert_eq!(
            conn,
            Connection::Multicast {
                group: Ipv4Addr::new(224, 0, 1, 0),
                port: 5000
            }
        );
    }

    #[test]
    fn test_communicating_mode() {
        let conn: Connection = "192.168.0.1:5000".parse().unwrap();
        assert_eq!(
            conn,
            Connection::Controller {
                host: "192.168.0.1".to_string(),
                port: 5000
            }
        );
        let conn: Connection = "atc-301422002:5000".parse().unwrap();
        assert_eq!(conn.controller_host(), Some("atc-301422002"));
    }

    #[test]
    fn test_firewall_mode() {
        let conn: Connection = "192.168.0.1:5000:fw".parse().unwrap();
        assert_eq!(
            conn,
            Connection::ControllerFw {
                host: "192.168.0.1".to_string(),
                port: 5000
            }
        );
    }

    #[test]
    fn test_invalid_strings() {
        assert!("".parse::<Connection>().is_err());
        assert!("host:notaport".parse::<Connection>().is_err());
        assert!("host:5000:xyz".parse::<Connection>().is_err());
        assert!("a:b:c:d".parse::<Connection>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["5000", "224.0.1.0:5000", "host:5000", "host:5000:fw"] {
            let conn: Connection = s.parse().unwrap();
            assert_eq!(conn.to_string(), s);
        }
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.data_timeout(), Duration::from_secs(1));
        assert_eq!(settings.command_timeout(), Duration::from_secs(10));
        assert_eq!(settings.data_buffer_size, 32_768);
    }

    #[test]
    fn test_settings_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_timeout_us = 500000").unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.data_timeout(), Duration::from_millis(500));
        // unspecified fields keep their defaults
        assert_eq!(settings.command_timeout(), Duration::from_secs(10));
    }
}
