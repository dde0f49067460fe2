//! huddle-server - WebSocket broadcast chat server
//!
//! Clients connect over WebSocket, register a display name with their first
//! frame and then exchange short text messages that are fanned out to every
//! connected client. `GET /` without an upgrade answers a liveness probe.

mod error;
pub mod fanout;
pub mod http;
pub mod registry;
pub mod session;
mod state;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

pub use error::{RegistryError, ServerError};
pub use http::create_router;
pub use registry::{ConnectionRegistry, SessionId};
pub use session::{Session, SessionState};
pub use state::AppState;

/// The main huddle server
pub struct HuddleServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HuddleServer {
    /// Create a new server with fresh state built from the config
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new().with_registration_timeout(config.registration_timeout);
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port);

        tracing::info!(
            "Server running at ws://{}:{}",
            self.config.public_host,
            port
        );

        let router = create_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(ServerError::Serve)
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Host name advertised in the startup log
    pub public_host: String,
    /// Close sessions that have not registered within this window.
    /// `None` lets a session wait indefinitely.
    pub registration_timeout: Option<Duration>,
}

/// Default port for the huddle server
pub const DEFAULT_PORT: u16 = 8080;
/// Default bind address for the huddle server
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default host name advertised in the startup log
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            public_host: DEFAULT_PUBLIC_HOST.to_string(),
            registration_timeout: None,
        }
    }

    /// Returns the socket address string (e.g., "0.0.0.0:8080")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
