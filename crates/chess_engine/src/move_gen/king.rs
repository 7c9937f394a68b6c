//! King move generation
//!
//! Kings move one square in any direction. Squares attacked by the opponent
//! are not filtered here; that happens in the legality check, which rejects
//! any move leaving the king in check. Castling is not generated.

use std::collections::HashSet;

use super::generate_step_moves;
use crate::board::Board;
use crate::constants::KING_STEPS;
use crate::types::{Color, Move, Position};

pub fn generate_king_moves(board: &Board, from: Position, color: Color, moves: &mut HashSet<Move>) {
    generate_step_moves(board, from, color, &KING_STEPS, moves);
}
