//! Per-connection session state machine
//!
//! A session starts in [`SessionState::Connecting`], sends the usage hint on
//! accept, treats exactly one inbound frame as its registration attempt and
//! relays every later frame as chat. Registration is single-shot: a rejected
//! first frame still moves the session to [`SessionState::Active`], where it
//! chats as "Anonymous" with no way to pick a name afterwards.
//!
//! The state machine is transport-agnostic. The WebSocket layer feeds it
//! decoded text frames and calls [`Session::close`] when the socket ends.

use tracing::{debug, info, warn};

use crate::fanout::{self, Audience};
use crate::registry::{ConnectionRegistry, FrameSender, SessionId};
use crate::ws::protocol::{
    ANONYMOUS, REGISTER_HINT, ServerMessage, parse_chat, parse_registration,
};

/// Text of the error sent when the registration timeout elapses
pub const REGISTRATION_TIMEOUT_MESSAGE: &str = "Registration timed out";

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted by the transport, not yet in the registry
    Connecting,
    /// Hint sent, waiting for the first frame
    AwaitingRegistration,
    /// Registration attempted (successfully or not); relaying chat
    Active,
    /// Removed from the registry
    Closed,
}

/// Server-side state for one connected client
pub struct Session {
    id: SessionId,
    name: Option<String>,
    state: SessionState,
    registry: ConnectionRegistry,
}

impl Session {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            id: SessionId::new(),
            name: None,
            state: SessionState::Connecting,
            registry,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Registered display name, if the handshake succeeded
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Queue the usage hint and join the registry.
    ///
    /// The hint is queued before the session becomes visible to broadcasts,
    /// so it is always the first frame the client sees.
    pub async fn accept(&mut self, sender: FrameSender) {
        if self.state != SessionState::Connecting {
            warn!(session_id = %self.id, state = ?self.state, "accept called twice");
            return;
        }

        if let Some(frame) = fanout::encode(&ServerMessage::system(REGISTER_HINT)) {
            let _ = sender.send(frame);
        }
        self.registry.add(self.id, sender).await;
        self.state = SessionState::AwaitingRegistration;

        info!(session_id = %self.id, "Session connected");
    }

    /// Dispatch one inbound text frame according to the current state
    pub async fn handle_frame(&mut self, text: &str) {
        match self.state {
            SessionState::AwaitingRegistration => self.register(text).await,
            SessionState::Active => self.relay(text).await,
            SessionState::Connecting | SessionState::Closed => {
                debug!(session_id = %self.id, state = ?self.state, "Ignoring frame");
            }
        }
    }

    async fn register(&mut self, text: &str) {
        self.state = SessionState::Active;

        let name = match parse_registration(text) {
            Ok(name) => name,
            Err(rejection) => {
                debug!(session_id = %self.id, ?rejection, "Registration rejected");
                let error = ServerMessage::error(rejection.message());
                fanout::send_to(&self.registry, self.id, &error).await;
                return;
            }
        };

        if let Err(e) = self.registry.set_name(self.id, name.clone()).await {
            warn!(session_id = %self.id, "Could not record display name: {}", e);
            return;
        }
        self.name = Some(name.clone());

        info!(session_id = %self.id, name = %name, "Session registered");

        fanout::send_to(&self.registry, self.id, &ServerMessage::welcome(&name)).await;
        fanout::broadcast(
            &self.registry,
            &ServerMessage::joined(&name),
            Audience::AllExcept(self.id),
        )
        .await;
    }

    async fn relay(&mut self, text: &str) {
        let Some(body) = parse_chat(text) else {
            debug!(session_id = %self.id, "Ignoring non-chat frame");
            return;
        };

        let sender = self.name.as_deref().unwrap_or(ANONYMOUS);
        fanout::broadcast(&self.registry, &ServerMessage::chat(sender, body), Audience::All).await;
    }

    /// Report an expired registration window to the client.
    ///
    /// Only meaningful while awaiting registration; the caller closes the
    /// connection afterwards.
    pub async fn registration_timed_out(&mut self) {
        if self.state != SessionState::AwaitingRegistration {
            return;
        }
        info!(session_id = %self.id, "Registration timed out");
        fanout::send_to(
            &self.registry,
            self.id,
            &ServerMessage::error(REGISTRATION_TIMEOUT_MESSAGE),
        )
        .await;
    }

    /// Leave the registry and announce the departure of a named session.
    /// Calling this more than once has no further effect.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        let removed = self.registry.remove(self.id).await;
        info!(session_id = %self.id, "Session disconnected");

        if let Some(Some(name)) = removed {
            fanout::broadcast(&self.registry, &ServerMessage::left(&name), Audience::All).await;
        }
    }
}
