//! Board storage and layout helpers
//!
//! The board is a fixed 64-cell array of optional pieces with no history.
//! It serializes as its rank layout: eight strings from row 8 down to row 1,
//! each eight characters wide, FEN letters for pieces and `.` for empty
//! squares. The standard start reads:
//!
//! ```text
//! rnbqkbnr
//! pppppppp
//! ........
//! ........
//! ........
//! ........
//! PPPPPPPP
//! RNBQKBNR
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{BACK_RANK, EMPTY_SQUARE};
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::{Color, Piece, PieceKind, Position};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Standard initial position, WHITE on rows 1 and 2
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for (i, &kind) in BACK_RANK.iter().enumerate() {
            let col = i as i32 + 1;
            board.put(1, col, Piece::new(Color::White, kind));
            board.put(2, col, Piece::new(Color::White, PieceKind::Pawn));
            board.put(7, col, Piece::new(Color::Black, PieceKind::Pawn));
            board.put(8, col, Piece::new(Color::Black, kind));
        }
        board
    }

    // Coordinates come from the constant setup loops, always in range.
    fn put(&mut self, row: i32, col: i32, piece: Piece) {
        let index = ((row - 1) * 8 + (col - 1)) as usize;
        self.cells[index] = Some(piece);
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.cells[pos.index()]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.cells[pos.index()] = piece;
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Color of the occupant, `None` for an empty square
    pub fn color_at(&self, pos: Position) -> Option<Color> {
        self.get(pos).map(|piece| piece.color)
    }

    /// Every square holding a piece of `color`, with that piece
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| match self.get(pos) {
            Some(piece) if piece.color == color => Some((pos, piece)),
            _ => None,
        })
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// Parse a rank layout, row 8 first
    pub fn from_ranks<S: AsRef<str>>(ranks: &[S]) -> ChessEngineResult<Board> {
        if ranks.len() != 8 {
            return Err(ChessEngineError::InvalidLayout {
                message: format!("expected 8 ranks, found {}", ranks.len()),
            });
        }

        let mut board = Board::empty();
        for (i, rank) in ranks.iter().enumerate() {
            let rank = rank.as_ref();
            let row = 8 - i as i32;
            if rank.chars().count() != 8 {
                return Err(ChessEngineError::InvalidLayout {
                    message: format!("rank {} must be 8 squares wide: {:?}", row, rank),
                });
            }
            for (j, c) in rank.chars().enumerate() {
                if c == EMPTY_SQUARE {
                    continue;
                }
                let piece = Piece::from_char(c).ok_or_else(|| ChessEngineError::InvalidLayout {
                    message: format!("unknown piece {:?} on rank {}", c, row),
                })?;
                board.put(row, j as i32 + 1, piece);
            }
        }
        Ok(board)
    }

    /// Rank layout, row 8 first
    pub fn ranks(&self) -> Vec<String> {
        (1..=8)
            .rev()
            .map(|row| {
                (1..=8)
                    .map(|col| {
                        let index = ((row - 1) * 8 + (col - 1)) as usize;
                        self.cells[index].map_or(EMPTY_SQUARE, Piece::to_char)
                    })
                    .collect()
            })
            .collect()
    }
}

impl From<Board> for Vec<String> {
    fn from(board: Board) -> Self {
        board.ranks()
    }
}

impl TryFrom<Vec<String>> for Board {
    type Error = ChessEngineError;

    fn try_from(ranks: Vec<String>) -> Result<Self, Self::Error> {
        Board::from_ranks(&ranks)
    }
}
