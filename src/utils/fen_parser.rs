//! FEN-to-Position parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including piece bitboards, rights, clocks, and occupancies. The two clock
//! fields may be omitted (they default to `0 1`), which is how many GUIs and
//! EPD files write positions.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::{chess_types::*, position::Position};
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> ChessResult<Position> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let mut position = Position::default();

    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;
    position.castling_rights = parse_castling_rights(castling_part)?;
    position.en_passant_square = parse_en_passant_square(en_passant_part)?;
    position.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("halfmove clock '{halfmove_part}'")))?;
    position.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("fullmove number '{fullmove_part}'")))?
        .max(1);

    position.recalc_occupancy();
    validate_kings(&position)?;

    Ok(position)
}

fn invalid(detail: &str) -> ChessError {
    ChessError::InvalidFen(detail.to_owned())
}

fn parse_board(board_part: &str, position: &mut Position) -> ChessResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(&format!("empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(invalid(&format!("rank '{rank_str}' has more than 8 files")));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| invalid(&format!("piece character '{ch}'")))?;

            let square = Square::new(file, board_rank).ok_or_else(|| invalid("rank has too many files"))?;
            position.pieces[piece.color.index()][piece.kind.index()] |= square.bit();
            file += 1;
        }

        if file != 8 {
            return Err(invalid(&format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(&format!("side-to-move field '{side_part}'"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(CastlingRights::NONE);
    }

    let mut rights = CastlingRights::NONE;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights.insert(CastlingRights::WHITE_KINGSIDE),
            'Q' => rights.insert(CastlingRights::WHITE_QUEENSIDE),
            'k' => rights.insert(CastlingRights::BLACK_KINGSIDE),
            'q' => rights.insert(CastlingRights::BLACK_QUEENSIDE),
            _ => return Err(invalid(&format!("castling rights character '{ch}'"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part).map_err(|_| invalid(&format!("en-passant square '{en_passant_part}'")))?;
    if square.rank() != 2 && square.rank() != 5 {
        return Err(invalid(&format!("en-passant square '{en_passant_part}' not on rank 3 or 6")));
    }
    Ok(Some(square))
}

fn validate_kings(position: &Position) -> ChessResult<()> {
    for color in Color::ALL {
        let kings = position.pieces[color.index()][PieceKind::King.index()].count_ones();
        if kings != 1 {
            return Err(invalid(&format!("{color} has {kings} kings")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{CastlingRights, Color};

    #[test]
    fn parse_starting_fen() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        println!("\n{position}");

        assert_eq!(position.side_to_move(), Color::White);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.castling_rights(), CastlingRights::ALL);
        assert_eq!(position.occupancy().count_ones(), 32);
    }

    #[test]
    fn clocks_default_when_omitted() {
        let position = parse_fen("4k3/8/8/8/8/8/8/4K3 b - -").expect("short FEN should parse");
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.side_to_move(), Color::Black);
    }

    #[test]
    fn rejects_malformed_fields() {
        for fen in [
            "8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w X - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e4 0 1",
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - zero 1",
        ] {
            let err = parse_fen(fen).expect_err("malformed FEN must be rejected");
            assert!(matches!(err, ChessError::InvalidFen(_)), "{fen}: {err}");
        }
    }

    #[test]
    fn overlong_rank_of_empty_squares_is_rejected() {
        for rank in ["8".repeat(40), "8".repeat(32), "45".to_owned(), "71p".to_owned()] {
            let fen = format!("{rank}/8/8/8/8/8/8/K6k w - - 0 1");
            let err = parse_fen(&fen).expect_err("rank wider than the board must be rejected");
            assert!(matches!(err, ChessError::InvalidFen(_)), "{fen}: {err}");
        }
    }
}
