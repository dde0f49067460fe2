//! Broadcast fan-out
//!
//! Serializes a [`ServerMessage`] once and queues it on the outbound channel
//! of every selected session. Delivery is fire-and-forget: a closed or failing
//! session is skipped and never stops delivery to the rest.

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::registry::{ConnectionRegistry, OutboundFrame, SessionHandle, SessionId};
use crate::ws::ServerMessage;

/// Which sessions a broadcast targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every live session, sender included
    All,
    /// Every live session except the given one
    AllExcept(SessionId),
}

impl Audience {
    fn includes(&self, id: SessionId) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => *excluded != id,
        }
    }
}

/// Serialize a message into a frame that can be shared across recipients
pub fn encode(message: &ServerMessage) -> Option<OutboundFrame> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            error!("Failed to serialize outgoing message: {}", e);
            None
        }
    }
}

/// Deliver a message to the selected sessions.
///
/// Returns how many sessions the frame was queued for.
pub async fn broadcast(
    registry: &ConnectionRegistry,
    message: &ServerMessage,
    audience: Audience,
) -> usize {
    let Some(frame) = encode(message) else {
        return 0;
    };

    let mut delivered = 0;
    for session in registry.all().await {
        if !audience.includes(session.id) {
            continue;
        }
        if deliver(&session, Arc::clone(&frame)) {
            delivered += 1;
        }
    }

    trace!("Broadcast queued for {} sessions", delivered);
    delivered
}

/// Deliver a message to a single session. Returns false if it was skipped.
pub async fn send_to(
    registry: &ConnectionRegistry,
    id: SessionId,
    message: &ServerMessage,
) -> bool {
    let Some(session) = registry.get(id).await else {
        debug!(session_id = %id, "Dropping message for unknown session");
        return false;
    };
    let Some(frame) = encode(message) else {
        return false;
    };
    deliver(&session, frame)
}

fn deliver(session: &SessionHandle, frame: OutboundFrame) -> bool {
    if !session.is_open() {
        debug!(session_id = %session.id, "Skipping session that is not open");
        return false;
    }
    if !session.send(frame) {
        debug!(session_id = %session.id, "Send failed, session is closing");
        return false;
    }
    true
}
