//! Per-match participant registry
//!
//! Maps each identity to the outbound channel of its current connection.
//! Channels are bounded. A send that fails because the peer is gone or its
//! queue is full drops that participant from the registry during the same
//! broadcast.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::ServerMessage;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

use crate::error::SessionResult;
use crate::store::Identity;

/// Frames queued per connection before it counts as unresponsive
pub const OUTBOUND_CAPACITY: usize = 64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound half of a client connection
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: Sender<String>,
}

impl Connection {
    /// New connection plus the receiver its transport writer drains
    pub fn channel() -> (Connection, Receiver<String>) {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Connection, Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Connection {
                id: ConnectionId::next(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Serialize and queue. `Ok(false)` when the peer is gone or backed up.
    pub fn send(&self, message: &ServerMessage) -> SessionResult<bool> {
        let text = serde_json::to_string(message)?;
        Ok(self.send_text(text))
    }

    pub fn send_text(&self, text: String) -> bool {
        self.tx.try_send(text).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    participants: HashMap<Identity, Connection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` for `identity`, returning the connection it
    /// replaced if the identity was already present
    pub fn add_participant(
        &mut self,
        identity: impl Into<Identity>,
        connection: Connection,
    ) -> Option<Connection> {
        self.participants.insert(identity.into(), connection)
    }

    pub fn remove_participant(&mut self, identity: &str) -> Option<Connection> {
        self.participants.remove(identity)
    }

    /// Remove whichever identity is bound to connection `id`. An identity
    /// that has since reconnected on a newer connection is left alone.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Identity> {
        let identity = self
            .participants
            .iter()
            .find(|(_, conn)| conn.id == id)
            .map(|(identity, _)| identity.clone())?;
        self.participants.remove(&identity);
        Some(identity)
    }

    /// Send to one participant. `Ok(false)` if absent or gone.
    pub fn send_to(&mut self, identity: &str, message: &ServerMessage) -> SessionResult<bool> {
        let Some(connection) = self.participants.get(identity) else {
            return Ok(false);
        };
        if connection.send(message)? {
            return Ok(true);
        }
        debug!("Pruning unreachable participant {}", identity);
        self.participants.remove(identity);
        Ok(false)
    }

    /// Send to every participant; returns how many were reached
    pub fn broadcast_all(&mut self, message: &ServerMessage) -> SessionResult<usize> {
        self.broadcast_filtered(None, message)
    }

    /// Send to every participant except `excluded`
    pub fn broadcast_except(
        &mut self,
        excluded: &str,
        message: &ServerMessage,
    ) -> SessionResult<usize> {
        self.broadcast_filtered(Some(excluded), message)
    }

    fn broadcast_filtered(
        &mut self,
        excluded: Option<&str>,
        message: &ServerMessage,
    ) -> SessionResult<usize> {
        let text = serde_json::to_string(message)?;
        let mut delivered = 0;

        self.participants.retain(|identity, connection| {
            if Some(identity.as_str()) == excluded {
                return true;
            }
            if connection.send_text(text.clone()) {
                delivered += 1;
                true
            } else {
                debug!("Pruning unreachable participant {}", identity);
                false
            }
        });

        Ok(delivered)
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.keys().map(String::as_str)
    }

    /// Forget every participant without closing their channels
    pub fn clear(&mut self) {
        self.participants.clear();
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.participants.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
