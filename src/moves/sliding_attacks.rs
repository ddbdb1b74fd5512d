//! Occupancy-aware ray attacks for bishops, rooks and queens.
//!
//! A ray includes the first occupied square it meets and stops there; the
//! caller masks out friendly blockers.

use crate::game_state::chess_types::Square;

const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    DIAGONAL_STEPS
        .iter()
        .fold(0u64, |acc, &(df, dr)| acc | trace_ray(square, df, dr, occupancy))
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    ORTHOGONAL_STEPS
        .iter()
        .fold(0u64, |acc, &(df, dr)| acc | trace_ray(square, df, dr, occupancy))
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

fn trace_ray(square: Square, file_step: i32, rank_step: i32, occupancy: u64) -> u64 {
    let mut file = square.file() as i32 + file_step;
    let mut rank = square.rank() as i32 + rank_step;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;

        if (occupancy & bit) != 0 {
            break;
        }

        file += file_step;
        rank += rank_step;
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_rays_from_d4_have_fourteen_squares() {
        let d4 = Square::new(3, 3).expect("d4");
        assert_eq!(rook_attacks(d4, 0).count_ones(), 14);
    }

    #[test]
    fn rook_blocker_stops_ray() {
        let a4 = Square::new(0, 3).expect("a4");
        let a5 = Square::new(0, 4).expect("a5");
        let attacks = rook_attacks(Square::A1, a4.bit());

        assert_ne!(attacks & a4.bit(), 0);
        assert_eq!(attacks & a5.bit(), 0);
    }

    #[test]
    fn bishop_and_queen_rays_from_corner() {
        assert_eq!(bishop_attacks(Square::A1, 0).count_ones(), 7);
        assert_eq!(queen_attacks(Square::A1, 0).count_ones(), 21);
    }
}
