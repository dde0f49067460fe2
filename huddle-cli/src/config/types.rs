use std::time::Duration;

use huddle_server::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PUBLIC_HOST};
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHuddleConfig {
    #[serde(default)]
    pub server: RawServerConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Address to bind to
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,

    /// Host name advertised in the startup log
    pub public_host: Option<String>,

    /// Seconds a new connection may take to register
    pub registration_timeout_secs: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HuddleConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Host name advertised in the startup log
    pub public_host: String,

    /// Seconds a new connection may take to register; unset waits forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_host: DEFAULT_PUBLIC_HOST.to_string(),
            registration_timeout_secs: None,
        }
    }
}

impl From<&ServerConfig> for huddle_server::ServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            public_host: config.public_host.clone(),
            registration_timeout: config.registration_timeout_secs.map(Duration::from_secs),
        }
    }
}
