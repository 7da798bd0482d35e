//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use serde::Deserialize;

use crate::server::error::Error;

const ADDR_VAR: &str = "MICROROUTE_ADDR";
const MAX_CONNECTIONS_VAR: &str = "MICROROUTE_MAX_CONNECTIONS";
const READ_BUFFER_SIZE_VAR: &str = "MICROROUTE_READ_BUFFER_SIZE";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
        }
    }
}

impl ServerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Read overrides from `MICROROUTE_ADDR`, `MICROROUTE_MAX_CONNECTIONS`
    /// and `MICROROUTE_READ_BUFFER_SIZE`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ADDR_VAR) {
            config.addr = parse_var(ADDR_VAR, &addr)?;
        }
        if let Some(max) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = parse_var(MAX_CONNECTIONS_VAR, &max)?;
        }
        if let Some(size) = lookup(READ_BUFFER_SIZE_VAR) {
            config.read_buffer_size = parse_var(READ_BUFFER_SIZE_VAR, &size)?;
        }

        config.validate()
    }

    fn validate(self) -> Result<Self, Error> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be greater than 0".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::Config("read_buffer_size must be greater than 0".to_string()));
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} has invalid value: {value}")))
}
