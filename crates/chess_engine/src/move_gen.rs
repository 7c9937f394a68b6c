//! Candidate move generation
//!
//! Produces the raw moves of a single piece from a board and a square,
//! following only the movement rules of its kind. Whether a move leaves the
//! mover's own king attacked is decided later by [`crate::game::Game`].
//!
//! Piece kind is a closed enum, so dispatch is an exhaustive `match` into
//! one submodule per kind. Every generator steps with
//! [`Position::offset`](crate::types::Position::offset), which returns
//! `None` off the board, so no generator can wrap across an edge.
//!
//! Castling and en passant are not generated.

mod bishop;
mod king;
mod knight;
mod pawn;
mod queen;
mod rook;
mod sliding;


use std::collections::HashSet;

use crate::board::Board;
use crate::types::{Color, Move, PieceKind, Position};

pub use bishop::generate_bishop_moves;
pub use king::generate_king_moves;
pub use knight::generate_knight_moves;
pub use pawn::generate_pawn_moves;
pub use queen::generate_queen_moves;
pub use rook::generate_rook_moves;

/// Candidate moves for the piece on `from`, empty if the square is empty
pub fn candidate_moves(board: &Board, from: Position) -> HashSet<Move> {
    let mut moves = HashSet::new();
    let Some(piece) = board.get(from) else {
        return moves;
    };

    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(board, from, piece.color, &mut moves),
        PieceKind::Knight => generate_knight_moves(board, from, piece.color, &mut moves),
        PieceKind::Bishop => generate_bishop_moves(board, from, piece.color, &mut moves),
        PieceKind::Rook => generate_rook_moves(board, from, piece.color, &mut moves),
        PieceKind::Queen => generate_queen_moves(board, from, piece.color, &mut moves),
        PieceKind::King => generate_king_moves(board, from, piece.color, &mut moves),
    }

    moves
}

/// True if any piece of `attacker` has a candidate move ending on `target`
pub fn is_square_attacked(board: &Board, target: Position, attacker: Color) -> bool {
    board
        .pieces(attacker)
        .any(|(from, _)| candidate_moves(board, from).iter().any(|mv| mv.end == target))
}

/// Fixed-offset generation shared by knights and kings: a destination is
/// kept when it is on the board and not held by a piece of `color`
pub(crate) fn generate_step_moves(
    board: &Board,
    from: Position,
    color: Color,
    steps: &[(i32, i32)],
    moves: &mut HashSet<Move>,
) {
    for &(d_row, d_col) in steps {
        let Some(to) = from.offset(d_row, d_col) else {
            continue;
        };
        if board.color_at(to) != Some(color) {
            moves.insert(Move::new(from, to));
        }
    }
}
