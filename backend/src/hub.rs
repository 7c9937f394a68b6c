//! Live sessions keyed by match id
//!
//! Each [`MatchSession`] pairs a registry with an async command lock. The
//! lock serializes whole commands against one match, including their store
//! round trips; the registry mutex is only ever held for synchronous work.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use shared::MatchId;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::registry::{ConnectionId, SessionRegistry};

#[derive(Debug, Default)]
pub struct MatchSession {
    registry: Mutex<SessionRegistry>,
    command_lock: AsyncMutex<()>,
}

impl MatchSession {
    /// Wait for exclusive command access to this match
    pub async fn lock(&self) -> AsyncMutexGuard<'_, ()> {
        self.command_lock.lock().await
    }

    /// Must not be held across an await point
    pub fn registry(&self) -> MutexGuard<'_, SessionRegistry> {
        self.registry.lock()
    }
}

#[derive(Debug, Default)]
pub struct SessionHub {
    sessions: Mutex<HashMap<MatchId, Arc<MatchSession>>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `match_id`, created on first use
    pub fn session(&self, match_id: MatchId) -> Arc<MatchSession> {
        self.sessions.lock().entry(match_id).or_default().clone()
    }

    pub fn get(&self, match_id: MatchId) -> Option<Arc<MatchSession>> {
        self.sessions.lock().get(&match_id).cloned()
    }

    /// Drop connection `id` from every session; returns how many it left
    pub fn disconnect(&self, id: ConnectionId) -> usize {
        let sessions: Vec<Arc<MatchSession>> = self.sessions.lock().values().cloned().collect();
        sessions
            .iter()
            .filter(|session| session.registry().remove_connection(id).is_some())
            .count()
    }

    /// Empty every registry. Sessions and their command locks are kept.
    pub fn clear(&self) {
        let sessions: Vec<Arc<MatchSession>> = self.sessions.lock().values().cloned().collect();
        for session in sessions {
            session.registry().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
