use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_KEEPALIVE_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LIVECHESS_ADDR is not a socket address: {0}")]
    InvalidAddr(String),

    #[error("LIVECHESS_KEEPALIVE_SECS is not a number of seconds: {0}")]
    InvalidKeepalive(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Ping interval for idle websockets, `None` when disabled
    pub keepalive: Option<Duration>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("LIVECHESS_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.clone()))?;

        let keepalive_secs = match lookup("LIVECHESS_KEEPALIVE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidKeepalive(raw.clone()))?,
            None => DEFAULT_KEEPALIVE_SECS,
        };
        let keepalive = (keepalive_secs > 0).then(|| Duration::from_secs(keepalive_secs));

        Ok(ServerConfig {
            bind_addr,
            keepalive,
        })
    }
}
