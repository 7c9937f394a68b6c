//! Storage collaborators
//!
//! The dispatcher never owns persistent state. It reads and writes through
//! three traits so the storage technology stays outside the live-session
//! core; [`crate::memory::MemoryStore`] implements all of them in memory.

use std::fmt;

use async_trait::async_trait;
use chess_engine::{Color, Game};
use serde::{Deserialize, Serialize};
use shared::MatchId;

use crate::error::StoreResult;

/// Resolved participant name
pub type Identity = String;

/// Lobby-side record of a match and its seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub name: String,
    pub white: Option<Identity>,
    pub black: Option<Identity>,
}

impl MatchRecord {
    pub fn new(id: MatchId, name: impl Into<String>) -> Self {
        MatchRecord {
            id,
            name: name.into(),
            white: None,
            black: None,
        }
    }

    /// Seat held by `identity`, checking WHITE first
    pub fn seat_of(&self, identity: &str) -> Option<Color> {
        if self.white.as_deref() == Some(identity) {
            Some(Color::White)
        } else if self.black.as_deref() == Some(identity) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn role_of(&self, identity: &str) -> Role {
        self.seat_of(identity).map_or(Role::Observer, Role::from)
    }

    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white.as_deref(),
            Color::Black => self.black.as_deref(),
        }
    }

    pub fn set_seat(&mut self, color: Color, identity: Option<Identity>) {
        match color {
            Color::White => self.white = identity,
            Color::Black => self.black = identity,
        }
    }

    pub fn clear_seat(&mut self, color: Color) {
        self.set_seat(color, None);
    }
}

/// How a connection takes part in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    White,
    Black,
    Observer,
}

impl From<Color> for Role {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Role::White,
            Color::Black => Role::Black,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::White => f.write_str("WHITE"),
            Role::Black => f.write_str("BLACK"),
            Role::Observer => f.write_str("OBSERVER"),
        }
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Identity behind `auth_token`, `None` if the token is unknown
    async fn resolve(&self, auth_token: &str) -> StoreResult<Option<Identity>>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get(&self, match_id: MatchId) -> StoreResult<Option<MatchRecord>>;

    async fn update(&self, record: &MatchRecord) -> StoreResult<()>;

    async fn create(&self, name: &str) -> StoreResult<MatchRecord>;

    async fn list(&self) -> StoreResult<Vec<MatchRecord>>;
}

/// Persisted board and side to move of each match
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load_game(&self, match_id: MatchId) -> StoreResult<Game>;

    async fn save_game(&self, match_id: MatchId, game: &Game) -> StoreResult<()>;
}
