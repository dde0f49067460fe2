//! Huddle serve command for running the chat server
//!
//! Settings come from the layered config files and environment, and any
//! flag given here takes precedence over them.

use anyhow::Result;
use clap::Args;
use huddle_server::{HuddleServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, HuddleConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Close connections that have not registered within this many seconds
    #[arg(long, value_name = "SECS")]
    pub registration_timeout: Option<u64>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of loaded configuration
    fn server_config(&self, config: &HuddleConfig) -> ServerConfig {
        let mut server = ServerConfig::from(&config.server);
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(secs) = self.registration_timeout {
            server.registration_timeout = Some(std::time::Duration::from_secs(secs));
        }
        server
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let server_config = args.server_config(&config);

    info!(
        "Starting huddle server on {}:{}",
        server_config.host, server_config.port
    );

    HuddleServer::new(server_config).run().await?;
    Ok(())
}
