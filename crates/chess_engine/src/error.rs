//! Error types for chess engine
//!
//! Provides custom error types for chess engine operations including
//! square validation, board layout parsing and move execution.

use thiserror::Error;

use crate::types::{Color, Move, Position};

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// Square coordinates outside the 8x8 board
    #[error("Invalid square: row {row}, column {col} (both must be 1-8)")]
    InvalidSquare { row: i32, col: i32 },

    /// No piece at source square
    #[error("No piece at source square {square}")]
    NoPieceAtSquare { square: Position },

    /// Piece does not belong to the side to move
    #[error("Piece at square {square} does not belong to {color}")]
    WrongPieceColor { square: Position, color: Color },

    /// Move is not among the legal moves of the piece
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// Board layout could not be parsed
    #[error("Invalid board layout: {message}")]
    InvalidLayout { message: String },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
