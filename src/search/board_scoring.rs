//! Pluggable board evaluation.
//!
//! Search delegates static scoring to the `BoardScorer` trait so heuristics
//! can be swapped without touching search code.

use crate::game_state::{chess_types::*, position::Position};

pub const MATE_SCORE: i32 = 30000;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, position: &Position) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    fn material_balance_white_minus_black(position: &Position) -> i32 {
        PieceKind::ALL
            .iter()
            .map(|&kind| {
                let white = position.pieces_of(Color::White, kind).count_ones() as i32;
                let black = position.pieces_of(Color::Black, kind).count_ones() as i32;
                (white - black) * Self::piece_value(kind)
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, position: &Position) -> i32 {
        from_side_to_move(position, Self::material_balance_white_minus_black(position))
    }
}

/// Material plus small bonuses for centralized minors and advanced pawns.
/// Enough to break ties between materially equal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalScorer;

impl PositionalScorer {
    fn centralization(square: Square) -> i32 {
        let file_distance = (2 * i32::from(square.file()) - 7).abs();
        let rank_distance = (2 * i32::from(square.rank()) - 7).abs();
        // 0 in the corners, 12 on the four center squares.
        14 - file_distance - rank_distance
    }

    fn pawn_advance(color: Color, square: Square) -> i32 {
        let rank = i32::from(square.rank());
        let steps = match color {
            Color::White => rank - 1,
            Color::Black => 6 - rank,
        };
        steps * 4
    }

    fn positional_white_minus_black(position: &Position) -> i32 {
        let mut score = 0i32;
        for color in Color::ALL {
            let sign = if color == Color::White { 1 } else { -1 };
            for kind in [PieceKind::Knight, PieceKind::Bishop] {
                for sq in SquareIter::new(position.pieces_of(color, kind)) {
                    score += sign * Self::centralization(sq);
                }
            }
            for sq in SquareIter::new(position.pieces_of(color, PieceKind::Pawn)) {
                score += sign * Self::pawn_advance(color, sq);
            }
        }
        score
    }
}

impl BoardScorer for PositionalScorer {
    fn score(&self, position: &Position) -> i32 {
        let total = MaterialScorer::material_balance_white_minus_black(position)
            + Self::positional_white_minus_black(position);
        from_side_to_move(position, total)
    }
}

#[inline]
fn from_side_to_move(position: &Position, white_minus_black: i32) -> i32 {
    match position.side_to_move() {
        Color::White => white_minus_black,
        Color::Black => -white_minus_black,
    }
}
