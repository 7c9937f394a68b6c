//! Chess rules for live two-player matches
//!
//! - `types` - Colors, piece kinds, positions and moves
//! - `board` - 8x8 storage and the rank-layout serialization
//! - `move_gen` - Candidate moves per piece kind
//! - `game` - Legality filtering, check, checkmate, stalemate and move execution
//! - `error` - Engine error type

pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod move_gen;
pub mod types;

pub use board::Board;
pub use error::{ChessEngineError, ChessEngineResult};
pub use game::Game;
pub use move_gen::candidate_moves;
pub use types::{Color, Move, Piece, PieceKind, Position};
