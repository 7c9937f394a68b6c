//! # Chess Engine Core Types
//!
//! Value types shared by the board, the move generator and the rules engine.
//!
//! ## Coordinates
//!
//! Squares are addressed as `(row, col)` with both components in `1..=8`.
//! Row 1 is WHITE's back rank, column 1 is the a-file, so `(2, 5)` is `e2`.
//! A [`Position`] can only be built through [`Position::new`] or
//! [`Position::offset`], which makes an out-of-board square unrepresentable
//! and rules out wraparound across the board edge during move generation.
//!
//! ## Wire Form
//!
//! All types derive serde. Colors and kinds serialize as upper-case names
//! (`"WHITE"`, `"QUEEN"`), positions as `{"row": 2, "col": 5}` and moves as
//! `{"start": .., "end": .., "promotion": "QUEEN"}` with `promotion` omitted
//! when there is none. Positions are range-checked during deserialization,
//! and a promotion must name one of [`PieceKind::PROMOTIONS`].

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{ChessEngineError, ChessEngineResult};

/// Side of the board a piece belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn push
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row from which pawns may advance two squares
    pub fn pawn_start_row(self) -> i32 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Far rank where pawns promote
    pub fn promotion_row(self) -> i32 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("WHITE"),
            Color::Black => f.write_str("BLACK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Kinds a pawn may promote to on the far rank
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Lower-case FEN letter
    fn letter(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }
}

/// A colored piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// FEN letter: upper-case for WHITE, lower-case for BLACK
    pub fn to_char(self) -> char {
        let letter = self.kind.letter();
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    /// Parse a FEN letter, `None` for anything that is not a piece
    pub fn from_char(c: char) -> Option<Piece> {
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }
}

/// A square on the board, `row` and `col` both in 1..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

/// Unchecked coordinates as they arrive over the wire
#[derive(Deserialize)]
struct RawPosition {
    row: i32,
    col: i32,
}

impl TryFrom<RawPosition> for Position {
    type Error = ChessEngineError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
    }
}

impl Position {
    pub fn new(row: i32, col: i32) -> ChessEngineResult<Position> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Ok(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(ChessEngineError::InvalidSquare { row, col })
        }
    }

    pub fn row(self) -> i32 {
        i32::from(self.row)
    }

    pub fn col(self) -> i32 {
        i32::from(self.col)
    }

    /// Square reached by stepping `(d_row, d_col)`, `None` when off the board
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Position> {
        Position::new(self.row() + d_row, self.col() + d_col).ok()
    }

    /// All 64 squares, row-major from (1, 1)
    pub fn all() -> impl Iterator<Item = Position> {
        (1u8..=8).flat_map(|row| (1u8..=8).map(move |col| Position { row, col }))
    }

    /// Zero-based index into a 64-cell array
    pub(crate) fn index(self) -> usize {
        usize::from(self.row - 1) * 8 + usize::from(self.col - 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col - 1) as char;
        write!(f, "{}{}", file, self.row)
    }
}

/// A move from `start` to `end`, with the promotion kind set only for a
/// pawn reaching the far rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "promotion_kind"
    )]
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Move {
            start,
            end,
            promotion: None,
        }
    }

    pub fn promoting(start: Position, end: Position, kind: PieceKind) -> Self {
        Move {
            start,
            end,
            promotion: Some(kind),
        }
    }
}

fn promotion_kind<'de, D>(deserializer: D) -> Result<Option<PieceKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let kind = Option::<PieceKind>::deserialize(deserializer)?;
    match kind {
        Some(kind) if !PieceKind::PROMOTIONS.contains(&kind) => {
            Err(de::Error::custom(format!("{:?} is not a promotion kind", kind)))
        }
        _ => Ok(kind),
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            write!(f, "={}", kind.letter().to_ascii_uppercase())?;
        }
        Ok(())
    }
}
