use crate::errors::{ChessError, ChessResult};
use crate::game_state::{chess_types::*, position::Position};
use crate::moves::chess_move::Move;
use crate::utils::algebraic::algebraic_to_square;

pub fn move_to_long_algebraic(mv: &Move) -> String {
    mv.to_string()
}

/// Parse coordinate text without a position; flags stay empty.
pub fn parse_move_coordinates(long_algebraic: &str) -> ChessResult<Move> {
    let text = long_algebraic.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessError::InvalidNotation(format!(
            "invalid long algebraic move: {long_algebraic}"
        )));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;

    match text[4..].chars().next() {
        None => Ok(Move::new(from, to)),
        Some(ch) => {
            let kind = char_to_promotion(ch)?;
            Ok(Move {
                promotion: Some(kind),
                ..Move::new(from, to)
            })
        }
    }
}

/// Parse a move and resolve it against the legal moves of `position`, so the
/// returned move carries the generator's flags.
pub fn parse_long_algebraic(long_algebraic: &str, position: &Position) -> ChessResult<Move> {
    let candidate = parse_move_coordinates(long_algebraic)?;
    position
        .find_legal(&candidate)
        .ok_or(ChessError::IllegalMove { mv: candidate })
}

fn char_to_promotion(ch: char) -> ChessResult<PieceKind> {
    match ch.to_ascii_lowercase() {
        'n' => Ok(PieceKind::Knight),
        'b' => Ok(PieceKind::Bishop),
        'r' => Ok(PieceKind::Rook),
        'q' => Ok(PieceKind::Queen),
        _ => Err(ChessError::InvalidNotation(format!(
            "invalid promotion piece character: {ch}"
        ))),
    }
}
