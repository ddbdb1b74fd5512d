//! Position × Move → Position.
//!
//! `apply_move` assumes the move came from the generator for this exact
//! position (it is the scratch step of the legality filter and the commit
//! step of the game state machine). It never fails: a move whose origin is
//! empty leaves the board untouched apart from the turn bookkeeping.

use crate::game_state::{chess_types::*, position::Position};
use crate::moves::chess_move::{Move, MoveFlags};

pub fn apply_move(position: &Position, mv: &Move) -> Position {
    let moving_color = position.side_to_move;
    let enemy_color = moving_color.opposite();
    let moved_piece = position.piece_at(mv.from).map(|piece| piece.kind);

    let mut next = position.clone();

    if let Some(moved_piece) = moved_piece {
        next.pieces[moving_color.index()][moved_piece.index()] &= !mv.from.bit();

        if mv.is_en_passant() {
            // The victim stands beside the mover, on the destination file.
            if let Some(victim) = Square::new(mv.to.file(), mv.from.rank()) {
                next.pieces[enemy_color.index()][PieceKind::Pawn.index()] &= !victim.bit();
            }
        } else {
            clear_enemy_piece_on_square(&mut next, enemy_color, mv.to);
        }

        let placed = mv.promotion.unwrap_or(moved_piece);
        next.pieces[moving_color.index()][placed.index()] |= mv.to.bit();

        if moved_piece == PieceKind::King {
            if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
                move_rook(&mut next, moving_color, rook_from, rook_to);
            }
        }

        update_castling_rights(&mut next, moving_color, mv, moved_piece);
    }

    next.en_passant_square = if mv.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH) {
        Square::from_index((mv.from.index() + mv.to.index()) / 2)
    } else {
        None
    };

    if moved_piece == Some(PieceKind::Pawn) || mv.is_capture() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if moving_color == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = enemy_color;
    next.recalc_occupancy();

    next
}

/// Rook origin and destination for a castling king move.
pub fn castling_rook_squares(mv: &Move) -> Option<(Square, Square)> {
    if mv.flags.contains(MoveFlags::CASTLE_KINGSIDE) {
        let rook_from = Square::new(7, mv.from.rank())?;
        let rook_to = Square::new(5, mv.from.rank())?;
        Some((rook_from, rook_to))
    } else if mv.flags.contains(MoveFlags::CASTLE_QUEENSIDE) {
        let rook_from = Square::new(0, mv.from.rank())?;
        let rook_to = Square::new(3, mv.from.rank())?;
        Some((rook_from, rook_to))
    } else {
        None
    }
}

fn clear_enemy_piece_on_square(position: &mut Position, enemy_color: Color, square: Square) {
    let mask = !square.bit();
    for bitboard in position.pieces[enemy_color.index()].iter_mut() {
        *bitboard &= mask;
    }
}

fn move_rook(position: &mut Position, color: Color, from: Square, to: Square) {
    let rooks = &mut position.pieces[color.index()][PieceKind::Rook.index()];
    *rooks &= !from.bit();
    *rooks |= to.bit();
}

fn update_castling_rights(position: &mut Position, moving_color: Color, mv: &Move, moved_piece: PieceKind) {
    if moved_piece == PieceKind::King {
        position.castling_rights.remove(CastlingRights::kingside(moving_color));
        position.castling_rights.remove(CastlingRights::queenside(moving_color));
    }

    if moved_piece == PieceKind::Rook {
        position.castling_rights.remove(CastlingRights::for_rook_home(mv.from));
    }

    // Capturing a rook on its home square also removes that right.
    position.castling_rights.remove(CastlingRights::for_rook_home(mv.to));
}
