//! Wire protocol shared by the live-match server and its clients

pub mod protocol;

pub use protocol::{ClientCommand, MatchId, ServerMessage};
