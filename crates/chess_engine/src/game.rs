//! Rules engine
//!
//! [`Game`] owns one [`Board`], the side to move and a terminal flag. Legal
//! moves are candidate moves filtered by simulation: each candidate is
//! applied to a copy of the board and rejected if the mover's king is
//! attacked afterwards. Nothing is cached, every query recomputes from the
//! current board.
//!
//! ## Cost
//!
//! Filtering one candidate runs candidate generation for every enemy piece,
//! so a full legal-move sweep is quadratic in the number of moves on the
//! board. On a fixed 64-square board this stays in the microsecond range
//! (see `benches/legal_moves.rs`); no make/unmake or attack tables are used.
//!
//! ## Missing Kings
//!
//! A board without a king of some color is not rejected. That color is never
//! in check, so legality filtering accepts all of its candidate moves and
//! checkmate is never reported for it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::move_gen::{candidate_moves, is_square_attacked};
use crate::types::{Color, Move, Piece, Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    board: Board,
    side_to_move: Color,
    #[serde(default)]
    terminal: bool,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// Standard starting position, WHITE to move
    pub fn new() -> Self {
        Game::from_board(Board::standard(), Color::White)
    }

    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Game {
            board,
            side_to_move,
            terminal: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// One-way transition, set when a player resigns
    pub fn mark_terminal(&mut self) {
        self.terminal = true;
    }

    /// Candidate moves of the piece on `from` that do not leave its own king
    /// in check. Empty if the square is empty.
    pub fn legal_moves(&self, from: Position) -> HashSet<Move> {
        let Some(piece) = self.board.get(from) else {
            return HashSet::new();
        };

        candidate_moves(&self.board, from)
            .into_iter()
            .filter(|mv| {
                let after = simulate(&self.board, piece, mv);
                !king_attacked(&after, piece.color)
            })
            .collect()
    }

    /// Union of legal moves over every piece of `color`
    pub fn all_legal_moves(&self, color: Color) -> HashSet<Move> {
        self.board
            .pieces(color)
            .flat_map(|(from, _)| self.legal_moves(from))
            .collect()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        king_attacked(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    fn has_any_legal_move(&self, color: Color) -> bool {
        self.board
            .pieces(color)
            .any(|(from, _)| !self.legal_moves(from).is_empty())
    }

    /// Apply `mv` for the side to move and hand the turn over.
    ///
    /// # Errors
    ///
    /// - [`ChessEngineError::NoPieceAtSquare`] if `mv.start` is empty
    /// - [`ChessEngineError::WrongPieceColor`] if the piece is not the side to move's
    /// - [`ChessEngineError::IllegalMove`] if `mv` is not among its legal moves
    ///
    /// The game is unchanged when an error is returned.
    pub fn make_move(&mut self, mv: Move) -> ChessEngineResult<()> {
        let piece = self
            .board
            .get(mv.start)
            .ok_or(ChessEngineError::NoPieceAtSquare { square: mv.start })?;

        if piece.color != self.side_to_move {
            return Err(ChessEngineError::WrongPieceColor {
                square: mv.start,
                color: self.side_to_move,
            });
        }

        if !self.legal_moves(mv.start).contains(&mv) {
            return Err(ChessEngineError::IllegalMove { mv });
        }

        self.board = simulate(&self.board, piece, &mv);
        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }
}

/// Board after moving `piece` along `mv`: start cleared, end holds the
/// piece or its promotion
fn simulate(board: &Board, piece: Piece, mv: &Move) -> Board {
    let mut next = board.clone();
    let placed = match mv.promotion {
        Some(kind) => Piece::new(piece.color, kind),
        None => piece,
    };
    next.set(mv.start, None);
    next.set(mv.end, Some(placed));
    next
}

fn king_attacked(board: &Board, color: Color) -> bool {
    match board.king_position(color) {
        Some(king) => is_square_attacked(board, king, color.opponent()),
        None => false,
    }
}
