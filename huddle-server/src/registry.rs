//! Connection registry
//!
//! Tracks every live chat session from accept until close, along with the
//! display name it registered (if any) and the channel feeding its socket
//! writer. Duplicate display names are allowed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::error::RegistryError;

/// Serialized frame queued for a session's socket writer
pub type OutboundFrame = Arc<str>;

/// Sending half of a session's outbound queue
pub type FrameSender = mpsc::UnboundedSender<OutboundFrame>;

/// Unique identifier of a connected session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Point-in-time view of one registered session, used for fan-out
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    pub name: Option<String>,
    sender: FrameSender,
}

impl SessionHandle {
    /// Whether the session's writer is still draining frames
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a frame without waiting. Returns false if the writer is gone.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        self.sender.send(frame).is_ok()
    }
}

struct Entry {
    name: Option<String>,
    sender: FrameSender,
}

/// Shared set of live sessions
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new, unnamed session.
    ///
    /// Re-adding an id that is already present replaces its sender but keeps
    /// it as a single entry.
    pub async fn add(&self, id: SessionId, sender: FrameSender) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Entry { name: None, sender });
    }

    /// Attach a display name to a session. A name can only be set once.
    pub async fn set_name(
        &self,
        id: SessionId,
        name: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession(id))?;

        if let Some(existing) = &entry.name {
            return Err(RegistryError::AlreadyNamed {
                id,
                name: existing.clone(),
            });
        }

        entry.name = Some(name.into());
        Ok(())
    }

    /// Remove a session. Returns `None` if it was already gone, otherwise the
    /// name it had registered (which may itself be `None`).
    pub async fn remove(&self, id: SessionId) -> Option<Option<String>> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id).map(|entry| entry.name)
    }

    /// Snapshot of all live sessions.
    ///
    /// The snapshot is copied out under the lock, so sessions joining or
    /// leaving while the caller iterates do not affect the iteration.
    pub async fn all(&self) -> std::vec::IntoIter<SessionHandle> {
        let sessions = self.sessions.read().await;
        let snapshot: Vec<SessionHandle> = sessions
            .iter()
            .map(|(id, entry)| SessionHandle {
                id: *id,
                name: entry.name.clone(),
                sender: entry.sender.clone(),
            })
            .collect();
        snapshot.into_iter()
    }

    /// Handle for a single session
    pub async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|entry| SessionHandle {
            id,
            name: entry.name.clone(),
            sender: entry.sender.clone(),
        })
    }

    /// Display name of a session, if it exists and registered one
    pub async fn name_of(&self, id: SessionId) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).and_then(|entry| entry.name.clone())
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
