//! In-memory implementation of the storage collaborators
//!
//! Game state is kept in its serialized JSON form so every load and save
//! goes through the same representation a relational store would hold.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chess_engine::{Color, Game};
use parking_lot::RwLock;
use shared::MatchId;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{GameStore, Identity, IdentityResolver, MatchRecord, MatchStore};

#[derive(Default)]
pub struct MemoryStore {
    tokens: RwLock<HashMap<String, Identity>>,
    matches: RwLock<BTreeMap<MatchId, MatchRecord>>,
    games: RwLock<HashMap<MatchId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh auth token for `identity`
    pub fn issue_token(&self, identity: impl Into<Identity>) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().insert(token.clone(), identity.into());
        token
    }

    /// Seat `identity` as `color`
    pub fn join(
        &self,
        match_id: MatchId,
        identity: impl Into<Identity>,
        color: Color,
    ) -> StoreResult<MatchRecord> {
        let mut matches = self.matches.write();
        let record = matches
            .get_mut(&match_id)
            .ok_or(StoreError::MissingMatch { match_id })?;
        if record.seat(color).is_some() {
            return Err(StoreError::SeatTaken { match_id, color });
        }
        record.set_seat(color, Some(identity.into()));
        Ok(record.clone())
    }

    /// Drop every token, match and game
    pub fn clear(&self) {
        self.tokens.write().clear();
        self.matches.write().clear();
        self.games.write().clear();
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn resolve(&self, auth_token: &str) -> StoreResult<Option<Identity>> {
        Ok(self.tokens.read().get(auth_token).cloned())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn get(&self, match_id: MatchId) -> StoreResult<Option<MatchRecord>> {
        Ok(self.matches.read().get(&match_id).cloned())
    }

    async fn update(&self, record: &MatchRecord) -> StoreResult<()> {
        let mut matches = self.matches.write();
        let slot = matches
            .get_mut(&record.id)
            .ok_or(StoreError::MissingMatch {
                match_id: record.id,
            })?;
        *slot = record.clone();
        Ok(())
    }

    async fn create(&self, name: &str) -> StoreResult<MatchRecord> {
        let initial = serde_json::to_string(&Game::new())?;
        let mut matches = self.matches.write();
        let id = matches.keys().next_back().map_or(1, |last| last + 1);
        let record = MatchRecord::new(id, name);
        matches.insert(id, record.clone());
        self.games.write().insert(id, initial);
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<MatchRecord>> {
        Ok(self.matches.read().values().cloned().collect())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn load_game(&self, match_id: MatchId) -> StoreResult<Game> {
        match self.games.read().get(&match_id) {
            Some(stored) => serde_json::from_str(stored)
                .map_err(|source| StoreError::CorruptGame { match_id, source }),
            None => Ok(Game::new()),
        }
    }

    async fn save_game(&self, match_id: MatchId, game: &Game) -> StoreResult<()> {
        let stored = serde_json::to_string(game)?;
        self.games.write().insert(match_id, stored);
        Ok(())
    }
}
