//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and `Square`
//! values reused by FEN, PGN and UCI components.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidNotation(format!("invalid square: {square}")));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(ChessError::InvalidNotation(format!("invalid file: {}", file as char)));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidNotation(format!("invalid rank: {}", rank as char)));
    }

    Square::new(file - b'a', rank - b'1')
        .ok_or_else(|| ChessError::InvalidNotation(format!("invalid square: {square}")))
}

/// Convert a square to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    square.to_string()
}
