//! Full legal move generation pipeline.
//!
//! Phase one walks every piece kind through a single table keyed by
//! `PieceKind` (leapers read precomputed tables, sliders trace rays, pawns and
//! castling have dedicated rules). Phase two applies each candidate to a
//! scratch position and drops it if the mover's king ends up attacked, or, for
//! castling, if the king crosses or lands on an attacked square.

use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::{is_king_in_check, is_square_attacked};
use crate::move_generation::legal_moves_king::{castling_path, generate_castling_moves};
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::moves::attack_tables::{king_attacks, knight_attacks};
use crate::moves::chess_move::{Move, MoveFlags};
use crate::moves::sliding_attacks::{bishop_attacks, queen_attacks, rook_attacks};

/// Destination set of a non-pawn piece standing on `square`.
#[inline]
pub fn piece_reach(kind: PieceKind, square: Square, occupancy: u64) -> u64 {
    match kind {
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, occupancy),
        PieceKind::Rook => rook_attacks(square, occupancy),
        PieceKind::Queen => queen_attacks(square, occupancy),
        PieceKind::King => king_attacks(square),
        // Pawn pushes and captures are not symmetric; see legal_moves_pawn.
        PieceKind::Pawn => 0,
    }
}

/// All geometrically valid moves for the side to move, ignoring own-king safety
/// (except that castling already requires the king not to be in check).
pub fn pseudo_legal_moves(position: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    let side = position.side_to_move;
    let own_occ = position.occupancy_by_color[side.index()];
    let enemy_occ = position.occupancy_by_color[side.opposite().index()];

    for kind in PieceKind::ALL {
        if kind == PieceKind::Pawn {
            generate_pawn_moves(position, &mut out);
            continue;
        }

        for from in SquareIter::new(position.pieces[side.index()][kind.index()]) {
            let targets = piece_reach(kind, from, position.occupancy_all) & !own_occ;
            for to in SquareIter::new(targets) {
                let flags = if to.bit() & enemy_occ != 0 {
                    MoveFlags::CAPTURE
                } else {
                    MoveFlags::NONE
                };
                out.push(Move::with_flags(from, to, flags));
            }
        }
    }

    generate_castling_moves(position, &mut out);
    out
}

/// Legal moves for the side to move. Pure and total; order is unspecified.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let side = position.side_to_move;
    let enemy = side.opposite();

    pseudo_legal_moves(position)
        .into_iter()
        .filter(|mv| {
            if mv.is_castle()
                && castling_path(mv)
                    .iter()
                    .flatten()
                    .any(|sq| is_square_attacked(position, *sq, enemy))
            {
                return false;
            }
            let next = apply_move(position, mv);
            !is_king_in_check(&next, side)
        })
        .collect()
}

/// Legal moves paired with the position each one produces.
pub fn legal_moves_with_positions(position: &Position) -> Vec<(Move, Position)> {
    let side = position.side_to_move;
    let enemy = side.opposite();

    pseudo_legal_moves(position)
        .into_iter()
        .filter(|mv| {
            !(mv.is_castle()
                && castling_path(mv)
                    .iter()
                    .flatten()
                    .any(|sq| is_square_attacked(position, *sq, enemy)))
        })
        .map(|mv| {
            let next = apply_move(position, &mv);
            (mv, next)
        })
        .filter(|(_, next)| !is_king_in_check(next, side))
        .collect()
}
