//! Precomputed attack bitboards for leaping pieces.
//!
//! Knight, king and pawn attacks depend only on the origin square (and pawn
//! color), so they are built once at compile time.

use crate::game_state::chess_types::{Color, Square};

pub const KNIGHT_ATTACKS: [u64; 64] = generate_leaper_table(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

pub const KING_ATTACKS: [u64; 64] = generate_leaper_table(&[
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
]);

pub const WHITE_PAWN_ATTACKS: [u64; 64] = generate_leaper_table(&[(-1, 1), (1, 1)]);
pub const BLACK_PAWN_ATTACKS: [u64; 64] = generate_leaper_table(&[(-1, -1), (1, -1)]);

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square.index() as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square.index() as usize]
}

/// Squares a pawn of `color` standing on `square` captures onto.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square.index() as usize],
        Color::Black => BLACK_PAWN_ATTACKS[square.index() as usize],
    }
}

const fn generate_leaper_table(offsets: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            attacks |= set_if_valid(file + offsets[i].0, rank + offsets[i].1);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_attacks_from_d4_has_eight_targets() {
        let d4 = Square::new(3, 3).expect("d4");
        assert_eq!(knight_attacks(d4).count_ones(), 8);
        assert_eq!(knight_attacks(Square::A1).count_ones(), 2);
    }

    #[test]
    fn king_attacks_respect_edges() {
        assert_eq!(king_attacks(Square::A1).count_ones(), 3);
        assert_eq!(king_attacks(Square::E1).count_ones(), 5);
    }

    #[test]
    fn pawn_attacks_are_color_dependent() {
        let e4 = Square::new(4, 3).expect("e4");
        let d5 = Square::new(3, 4).expect("d5");
        let d3 = Square::new(3, 2).expect("d3");
        assert_ne!(pawn_attacks(Color::White, e4) & d5.bit(), 0);
        assert_eq!(pawn_attacks(Color::White, e4) & d3.bit(), 0);
        assert_ne!(pawn_attacks(Color::Black, e4) & d3.bit(), 0);
        assert_eq!(pawn_attacks(Color::White, Square::H8), 0);
        assert_eq!(pawn_attacks(Color::Black, Square::A1), 0);
    }
}
