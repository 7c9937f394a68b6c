//! Knight move generation
//!
//! Knights take the eight L-shaped steps from [`KNIGHT_STEPS`], jumping
//! over anything in between. A step is kept when it stays on the board and
//! does not land on a piece of the knight's own color.

use std::collections::HashSet;

use super::generate_step_moves;
use crate::board::Board;
use crate::constants::KNIGHT_STEPS;
use crate::types::{Color, Move, Position};

/// Generate knight moves from a given square
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = HashSet::new();
/// generate_knight_moves(&board, b1, Color::White, &mut moves);
/// // Moves now contains a3 and c3 from the starting position
/// ```
pub fn generate_knight_moves(
    board: &Board,
    from: Position,
    color: Color,
    moves: &mut HashSet<Move>,
) {
    generate_step_moves(board, from, color, &KNIGHT_STEPS, moves);
}
