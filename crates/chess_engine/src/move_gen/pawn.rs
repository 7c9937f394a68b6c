//! Pawn move generation
//!
//! Handles pawn-specific move generation including:
//! - Single and double forward pushes
//! - Diagonal captures
//! - Promotion on the far rank
//!
//! ## Pawn Movement Rules
//!
//! - **Forward push**: one square toward the opponent, only onto an empty square
//! - **Double push**: from the starting rank (row 2 for WHITE, row 7 for
//!   BLACK), two squares when both the intermediate and destination squares
//!   are empty
//! - **Captures**: one square diagonally forward, only onto an opponent piece
//! - **Promotion**: any push or capture landing on the far rank expands into
//!   one move per promotion kind (queen, rook, bishop, knight)
//!
//! En passant is not generated.

use std::collections::HashSet;

use crate::board::Board;
use crate::types::{Color, Move, PieceKind, Position};

/// Generate pawn moves from a given square
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = HashSet::new();
/// generate_pawn_moves(&board, e2, Color::White, &mut moves);
/// // Moves now contains e2-e3, e2-e4, and any diagonal captures
/// ```
pub fn generate_pawn_moves(board: &Board, from: Position, color: Color, moves: &mut HashSet<Move>) {
    let dir = color.pawn_direction();

    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            push_pawn_move(from, one, color, moves);

            if from.row() == color.pawn_start_row() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.is_empty(two) {
                        push_pawn_move(from, two, color, moves);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        if let Some(target) = from.offset(dir, d_col) {
            if board.color_at(target) == Some(color.opponent()) {
                push_pawn_move(from, target, color, moves);
            }
        }
    }
}

fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut HashSet<Move>) {
    if to.row() == color.promotion_row() {
        for kind in PieceKind::PROMOTIONS {
            moves.insert(Move::promoting(from, to, kind));
        }
    } else {
        moves.insert(Move::new(from, to));
    }
}
