use chess_engine::{Game, Move};
use serde::{Deserialize, Serialize};

pub type MatchId = u32;

/// Client → Server commands
///
/// ```json
/// {"type": "MAKE_MOVE", "authToken": "..", "matchId": 3,
///  "move": {"start": {"row": 2, "col": 5}, "end": {"row": 4, "col": 5}}}
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    Connect {
        auth_token: String,
        match_id: MatchId,
    },
    MakeMove {
        auth_token: String,
        match_id: MatchId,
        #[serde(rename = "move")]
        mv: Move,
    },
    Leave {
        auth_token: String,
        match_id: MatchId,
    },
    Resign {
        auth_token: String,
        match_id: MatchId,
    },
}

impl ClientCommand {
    pub fn auth_token(&self) -> &str {
        match self {
            ClientCommand::Connect { auth_token, .. }
            | ClientCommand::MakeMove { auth_token, .. }
            | ClientCommand::Leave { auth_token, .. }
            | ClientCommand::Resign { auth_token, .. } => auth_token,
        }
    }

    pub fn match_id(&self) -> MatchId {
        match self {
            ClientCommand::Connect { match_id, .. }
            | ClientCommand::MakeMove { match_id, .. }
            | ClientCommand::Leave { match_id, .. }
            | ClientCommand::Resign { match_id, .. } => *match_id,
        }
    }

    /// Wire name of the command, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientCommand::Connect { .. } => "CONNECT",
            ClientCommand::MakeMove { .. } => "MAKE_MOVE",
            ClientCommand::Leave { .. } => "LEAVE",
            ClientCommand::Resign { .. } => "RESIGN",
        }
    }
}

/// Server → Client messages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Full current state of the match
    LoadGame { game: Game },
    Notification { message: String },
    Error { message: String },
}

impl ServerMessage {
    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
