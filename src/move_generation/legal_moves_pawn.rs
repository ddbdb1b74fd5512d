//! Pseudo-legal pawn moves: pushes, double pushes, captures, en passant and
//! promotion expansion.

use crate::game_state::{chess_types::*, position::Position};
use crate::moves::attack_tables::pawn_attacks;
use crate::moves::chess_move::{Move, MoveFlags};

pub fn generate_pawn_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let enemy_occ = position.occupancy_by_color[side.opposite().index()];
    let empty = !position.occupancy_all;
    let (forward, start_rank, promotion_rank) = match side {
        Color::White => (1i8, 1u8, 7u8),
        Color::Black => (-1i8, 6u8, 0u8),
    };

    for from in SquareIter::new(position.pieces[side.index()][PieceKind::Pawn.index()]) {
        if let Some(one_step) = from.offset(0, forward) {
            if one_step.bit() & empty != 0 {
                push_with_promotions(out, from, one_step, MoveFlags::NONE, promotion_rank);

                if from.rank() == start_rank {
                    if let Some(two_step) = from.offset(0, 2 * forward) {
                        if two_step.bit() & empty != 0 {
                            out.push(Move::with_flags(from, two_step, MoveFlags::DOUBLE_PAWN_PUSH));
                        }
                    }
                }
            }
        }

        let attacks = pawn_attacks(side, from);
        for to in SquareIter::new(attacks & enemy_occ) {
            push_with_promotions(out, from, to, MoveFlags::CAPTURE, promotion_rank);
        }

        if let Some(target) = position.en_passant_square {
            if attacks & target.bit() & empty != 0 {
                out.push(Move::with_flags(from, target, MoveFlags::CAPTURE | MoveFlags::EN_PASSANT));
            }
        }
    }
}

fn push_with_promotions(out: &mut Vec<Move>, from: Square, to: Square, flags: MoveFlags, promotion_rank: u8) {
    if to.rank() == promotion_rank {
        for promotion in PieceKind::PROMOTIONS {
            out.push(Move::promoting(from, to, promotion, flags));
        }
    } else {
        out.push(Move::with_flags(from, to, flags));
    }
}
