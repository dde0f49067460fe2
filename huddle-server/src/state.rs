//! Shared application state for the huddle server

use std::time::Duration;

use crate::registry::ConnectionRegistry;

/// Shared application state accessible by all handlers
#[derive(Clone, Default)]
pub struct AppState {
    /// Every live chat session
    pub registry: ConnectionRegistry,
    /// How long a new session may wait before its registration frame.
    /// `None` waits indefinitely.
    pub registration_timeout: Option<Duration>,
}

impl AppState {
    /// Create a new AppState with an empty registry and no registration timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Close sessions that have not registered within `timeout`
    pub fn with_registration_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.registration_timeout = timeout;
        self
    }
}
