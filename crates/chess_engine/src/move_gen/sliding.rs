//! Sliding piece move generation
//!
//! Common functionality for sliding pieces (bishops, rooks, queens).
//! These pieces can move multiple squares in a direction until blocked.
//!
//! ## Algorithm
//!
//! For each direction vector:
//! 1. Step one square at a time from the source
//! 2. Stop at the board edge
//! 3. Empty squares are valid destinations, keep walking
//! 4. An opponent piece is a valid capture, then the direction ends
//! 5. An own piece ends the direction without a move

use std::collections::HashSet;

use crate::board::Board;
use crate::types::{Color, Move, Position};

/// Walk each direction in `dirs` from `from`, appending reachable squares
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = HashSet::new();
/// generate_sliding_moves(&board, a1, Color::White, &ROOK_DIRS, &mut moves);
/// ```
pub fn generate_sliding_moves(
    board: &Board,
    from: Position,
    color: Color,
    dirs: &[(i32, i32)],
    moves: &mut HashSet<Move>,
) {
    for &(d_row, d_col) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            match board.color_at(to) {
                None => {
                    moves.insert(Move::new(from, to));
                    current = to;
                }
                Some(occupant) => {
                    if occupant != color {
                        moves.insert(Move::new(from, to));
                    }
                    break;
                }
            }
        }
    }
}
