//! Error types for the live-match backend
//!
//! [`SessionError`] is the taxonomy reported to clients: every variant is
//! caught at the dispatcher boundary and turned into an ERROR message for
//! the triggering connection only. [`StoreError`] covers the storage
//! collaborators and always surfaces to clients as an internal failure.

use chess_engine::Color;
use shared::MatchId;
use thiserror::Error;

/// Errors a command can fail with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Missing or unresolvable auth token
    #[error("unauthorized")]
    Unauthorized,

    #[error("match {match_id} not found")]
    NotFound { match_id: MatchId },

    /// A non-seated identity tried to act as a player
    #[error("observers cannot {action}")]
    ObserverAction { action: &'static str },

    /// Wrong turn, move not legal, or match already over
    #[error("{reason}")]
    IllegalMove { reason: &'static str },

    /// Inbound frame did not parse as a command
    #[error("malformed command: {0}")]
    Malformed(String),

    /// Store or transport failure
    #[error("internal failure: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn game_over() -> Self {
        SessionError::IllegalMove {
            reason: "game already over",
        }
    }

    pub fn not_your_turn() -> Self {
        SessionError::IllegalMove {
            reason: "not your turn",
        }
    }

    pub fn invalid_move() -> Self {
        SessionError::IllegalMove {
            reason: "invalid move",
        }
    }

    /// Text of the ERROR message sent to the client. Internal details stay
    /// in the server log.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Internal(_) => "Error: internal failure".to_string(),
            other => format!("Error: {}", other),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Internal(format!("message encoding failed: {}", err))
    }
}

/// Result type alias for command handling
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the identity, match and game-state stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("match {match_id} does not exist")]
    MissingMatch { match_id: MatchId },

    #[error("{color} seat of match {match_id} is already taken")]
    SeatTaken { match_id: MatchId, color: Color },

    /// Persisted game state failed to decode
    #[error("stored game for match {match_id} is corrupt: {source}")]
    CorruptGame {
        match_id: MatchId,
        #[source]
        source: serde_json::Error,
    },

    #[error("game state encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
