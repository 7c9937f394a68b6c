//! Rook move generation
//!
//! Rooks slide along ranks and files until blocked by another piece or the
//! board edge, capturing the first opponent piece they meet.

use std::collections::HashSet;

use super::sliding;
use crate::board::Board;
use crate::constants::ROOK_DIRS;
use crate::types::{Color, Move, Position};

pub fn generate_rook_moves(board: &Board, from: Position, color: Color, moves: &mut HashSet<Move>) {
    sliding::generate_sliding_moves(board, from, color, &ROOK_DIRS, moves);
}
