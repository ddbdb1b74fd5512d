//! Zobrist hashing for position identity and repetition tracking.
//!
//! The keys are generated from a fixed seed so signatures are deterministic
//! across runs. Two positions share a signature when placement, side to move,
//! castling rights and en-passant file agree; the move clocks are excluded.

use std::sync::OnceLock;

use crate::game_state::{chess_types::*, position::Position};

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color {
            for sq in piece {
                *sq = next_random_u64(&mut seed);
            }
        }
    }

    let side_to_move = next_random_u64(&mut seed);

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = next_random_u64(&mut seed);
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random_u64(&mut seed);
    }

    ZobristTables {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
pub fn piece_square_key(piece: Piece, square: Square) -> u64 {
    tables().piece_square[piece.color.index()][piece.kind.index()][usize::from(square.index())]
}

/// Signature of a position for repetition detection.
pub fn position_signature(position: &Position) -> u64 {
    let tables = tables();
    let mut key = 0u64;

    for color in Color::ALL {
        for kind in PieceKind::ALL {
            for sq in SquareIter::new(position.pieces_of(color, kind)) {
                key ^= piece_square_key(Piece::new(kind, color), sq);
            }
        }
    }

    if position.side_to_move() == Color::Black {
        key ^= tables.side_to_move;
    }

    key ^= tables.castling[usize::from(position.castling_rights().bits() & 0x0F)];

    if let Some(ep_square) = position.en_passant_square() {
        key ^= tables.en_passant_file[usize::from(ep_square.file())];
    }

    key
}

#[cfg(test)]
mod tests {
    use super::position_signature;
    use crate::game_state::position::Position;
    use crate::utils::long_algebraic::parse_long_algebraic;

    fn signature(fen: &str) -> u64 {
        position_signature(&Position::from_fen(fen).expect("FEN should parse"))
    }

    #[test]
    fn starting_position_signature_is_deterministic() {
        assert_eq!(
            position_signature(&Position::starting()),
            position_signature(&Position::starting())
        );
    }

    #[test]
    fn side_castling_and_en_passant_change_signature() {
        assert_ne!(
            signature("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            signature("4k3/8/8/8/8/8/8/4K3 b - - 0 1")
        );
        assert_ne!(
            signature("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1"),
            signature("4k3/8/8/8/8/8/8/R3K2R w - - 0 1")
        );
        assert_ne!(
            signature("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1"),
            signature("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1")
        );
    }

    #[test]
    fn clocks_do_not_change_signature() {
        assert_eq!(
            signature("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            signature("4k3/8/8/8/8/8/8/4K3 w - - 37 90")
        );
    }

    #[test]
    fn knight_shuffle_returns_to_same_signature() {
        let start = Position::starting();
        let mut position = start.clone();
        for lan in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = parse_long_algebraic(lan, &position).expect("move should parse");
            position = position.play(&mv).expect("move should apply");
        }
        assert_eq!(position_signature(&position), position_signature(&start));
        assert_ne!(position, start);
    }
}
