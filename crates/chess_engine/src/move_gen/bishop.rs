//! Bishop move generation
//!
//! Bishops slide diagonally and therefore never leave their square color.

use std::collections::HashSet;

use super::sliding;
use crate::board::Board;
use crate::constants::BISHOP_DIRS;
use crate::types::{Color, Move, Position};

pub fn generate_bishop_moves(
    board: &Board,
    from: Position,
    color: Color,
    moves: &mut HashSet<Move>,
) {
    sliding::generate_sliding_moves(board, from, color, &BISHOP_DIRS, moves);
}
