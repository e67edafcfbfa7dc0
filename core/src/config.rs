//! Configuration management

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server information
    pub server: ServerConfig,
    /// Connection settings
    pub connection: ConnectionConfig,
    /// Hostname lookup settings
    pub lookup: LookupConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server hostname, used as the prefix of server-originated messages
    pub name: String,
    /// Network display name shown in the welcome burst
    pub network: String,
    /// Server version
    pub version: String,
    /// Server creation date (free text, usually a year)
    pub created: String,
    /// Message of the day, one MOTD line per text line
    pub motd: String,
    /// Maximum nickname length
    pub max_nickname_length: usize,
    /// Maximum topic length
    pub max_topic_length: usize,
    /// Maximum channel name length, including the leading `#`
    pub max_channel_name_length: usize,
    /// Maximum number of channels per client
    pub max_channels_per_client: usize,
}

/// Listener and per-connection limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Bind address
    pub bind_address: String,
    /// Listening port
    pub port: u16,
    /// Ping timeout (seconds)
    pub ping_timeout: u64,
    /// Maximum wait of the event loop between liveness sweeps (seconds)
    pub heartbeat_interval: u64,
    /// Simultaneous connections allowed from one IP address
    pub max_connections_per_ip: usize,
    /// Bytes a client may send without a line terminator before "Excess Flood"
    pub recv_buffer_size: usize,
    /// Bytes of unsent output allowed per client before "SendQ exceeded"
    pub send_queue_size: usize,
}

/// Reverse DNS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Resolve client hostnames at connect time
    pub enable_reverse_dns: bool,
    /// Lookup timeout (seconds)
    pub timeout: u64,
    /// How long a resolved hostname is cached (seconds)
    pub cache_ttl: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "irc.localhost".to_string(),
            network: "TinyNet".to_string(),
            version: format!("tinyircd-{}", env!("CARGO_PKG_VERSION")),
            created: chrono::Utc::now().format("%Y").to_string(),
            motd: "Welcome to tinyircd.\nBe nice.".to_string(),
            max_nickname_length: 16,
            max_topic_length: 300,
            max_channel_name_length: 50,
            max_channels_per_client: 20,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6667,
            ping_timeout: 120,
            heartbeat_interval: 25,
            max_connections_per_ip: 3,
            recv_buffer_size: 1024,
            send_queue_size: 64 * 1024,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enable_reverse_dns: true,
            timeout: 5,
            cache_ttl: 3600,
        }
    }
}

impl ConnectionConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }

    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.name.is_empty() || self.server.name.contains(' ') {
            return Err(Error::Config(
                "Server name must be non-empty and contain no spaces".to_string(),
            ));
        }

        if self.connection.port == 0 {
            return Err(Error::Config("Port cannot be 0".to_string()));
        }

        if self.connection.ping_timeout < 2 {
            return Err(Error::Config("Ping timeout must be at least 2 seconds".to_string()));
        }

        if self.connection.heartbeat_interval == 0 {
            return Err(Error::Config("Heartbeat interval must be greater than 0".to_string()));
        }

        if self.connection.max_connections_per_ip == 0 {
            return Err(Error::Config(
                "Max connections per IP must be greater than 0".to_string(),
            ));
        }

        if self.connection.recv_buffer_size < 512 {
            return Err(Error::Config(
                "Receive buffer must hold at least one 512 byte IRC line".to_string(),
            ));
        }

        if self.connection.send_queue_size < 512 {
            return Err(Error::Config("Send queue must be at least 512 bytes".to_string()));
        }

        if self.server.max_nickname_length == 0 {
            return Err(Error::Config("Max nickname length must be greater than 0".to_string()));
        }

        if self.server.max_channel_name_length < 2 {
            return Err(Error::Config("Max channel name length must be at least 2".to_string()));
        }

        if self.server.max_channels_per_client == 0 {
            return Err(Error::Config(
                "Max channels per client must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// MOTD lines; empty when no MOTD is configured
    pub fn motd_lines(&self) -> Vec<&str> {
        if self.server.motd.trim().is_empty() {
            return Vec::new();
        }
        self.server.motd.lines().collect()
    }
}
