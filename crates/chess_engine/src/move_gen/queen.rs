//! Queen move generation
//!
//! The queen combines rook and bishop movement: all eight directions.

use std::collections::HashSet;

use super::sliding;
use crate::board::Board;
use crate::constants::QUEEN_DIRS;
use crate::types::{Color, Move, Position};

/// Generate queen moves from a given square
///
/// Equivalent to the union of rook and bishop moves from the same square.
pub fn generate_queen_moves(
    board: &Board,
    from: Position,
    color: Color,
    moves: &mut HashSet<Move>,
) {
    sliding::generate_sliding_moves(board, from, color, &QUEEN_DIRS, moves);
}
