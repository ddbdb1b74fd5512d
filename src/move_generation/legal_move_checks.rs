//! Attack queries over a position.
//!
//! `is_square_attacked` is the primitive used for check detection and
//! castling legality. It only inspects piece geometry and never asks whether
//! the attacker's own king would be safe.

use crate::game_state::{chess_types::*, position::Position};
use crate::moves::attack_tables::{king_attacks, knight_attacks, pawn_attacks};
use crate::moves::sliding_attacks::{bishop_attacks, rook_attacks};

#[inline]
pub fn king_square(position: &Position, color: Color) -> Option<Square> {
    let kings = position.pieces[color.index()][PieceKind::King.index()];
    if kings == 0 {
        None
    } else {
        Some(Square::from_lsb(kings))
    }
}

#[inline]
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    let Some(king_sq) = king_square(position, color) else {
        return false;
    };
    is_square_attacked(position, king_sq, color.opposite())
}

pub fn is_square_attacked(position: &Position, square: Square, attacker_color: Color) -> bool {
    let attacker = &position.pieces[attacker_color.index()];

    // A pawn of the attacking color attacks `square` exactly when a pawn of
    // the defending color on `square` would attack the pawn's square.
    if pawn_attacks(attacker_color.opposite(), square) & attacker[PieceKind::Pawn.index()] != 0 {
        return true;
    }

    if knight_attacks(square) & attacker[PieceKind::Knight.index()] != 0 {
        return true;
    }

    if king_attacks(square) & attacker[PieceKind::King.index()] != 0 {
        return true;
    }

    let queens = attacker[PieceKind::Queen.index()];
    let bishops_queens = attacker[PieceKind::Bishop.index()] | queens;
    if bishops_queens != 0 && bishop_attacks(square, position.occupancy_all) & bishops_queens != 0 {
        return true;
    }

    let rooks_queens = attacker[PieceKind::Rook.index()] | queens;
    if rooks_queens != 0 && rook_attacks(square, position.occupancy_all) & rooks_queens != 0 {
        return true;
    }

    false
}
