use crate::game_state::{chess_types::*, position::Position};

pub fn generate_fen(position: &Position) -> String {
    let side_to_move = match position.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };
    let en_passant = position
        .en_passant_square
        .map(|sq| sq.to_string())
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} {} {}",
        generate_board_field(position),
        side_to_move,
        generate_castling_field(position.castling_rights),
        en_passant,
        position.halfmove_clock,
        position.fullmove_number
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            let piece = Square::new(file, rank).and_then(|sq| position.piece_at(sq));
            if let Some(piece) = piece {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(piece.fen_char());
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    for (flag, ch) in [
        (CastlingRights::WHITE_KINGSIDE, 'K'),
        (CastlingRights::WHITE_QUEENSIDE, 'Q'),
        (CastlingRights::BLACK_KINGSIDE, 'k'),
        (CastlingRights::BLACK_QUEENSIDE, 'q'),
    ] {
        if rights.contains(flag) {
            out.push(ch);
        }
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::generate_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{CastlingRights, Color};
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn round_trip_starting_position_fen() {
        let parsed = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, STARTING_POSITION_FEN);
        assert_eq!(parse_fen(&generated).expect("generated FEN should parse"), parsed);
    }

    #[test]
    fn round_trip_custom_position_fen() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6";
        let parsed = parse_fen(fen).expect("custom FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, fen);
        assert_eq!(parsed.side_to_move(), Color::Black);
        assert_eq!(
            parsed.castling_rights(),
            CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE
        );
        assert_eq!(parsed.halfmove_clock(), 4);
        assert_eq!(parsed.fullmove_number(), 6);
    }

    #[test]
    fn en_passant_field_is_written() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
        let parsed = parse_fen(fen).expect("FEN should parse");
        assert_eq!(generate_fen(&parsed), fen);
    }
}
