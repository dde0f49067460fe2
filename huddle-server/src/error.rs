//! Server error types

use thiserror::Error;

use crate::registry::SessionId;

/// Errors that can occur while running the huddle server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP/WebSocket listener stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Misuse of the connection registry
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// The session is not (or no longer) in the registry
    #[error("session not found: {0}")]
    UnknownSession(SessionId),

    /// A display name was already attached to this session
    #[error("session {id} is already registered as {name:?}")]
    AlreadyNamed { id: SessionId, name: String },
}
