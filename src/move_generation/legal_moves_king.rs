//! Castling generation.
//!
//! Ordinary king steps come from the shared table-driven generator; this
//! module adds the two castling moves. Castling is emitted only when the
//! right is held, the squares between king and rook are empty, and the king
//! is not currently in check. The transit and destination checks belong to
//! the legality filter.

use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::chess_move::{Move, MoveFlags};

pub fn generate_castling_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let home_rank = match side {
        Color::White => 0,
        Color::Black => 7,
    };
    let Some(king_from) = Square::new(4, home_rank) else {
        return;
    };
    if position.pieces[side.index()][PieceKind::King.index()] & king_from.bit() == 0 {
        return;
    }

    let can_kingside = position.castling_rights.contains(CastlingRights::kingside(side));
    let can_queenside = position.castling_rights.contains(CastlingRights::queenside(side));
    if !can_kingside && !can_queenside {
        return;
    }

    // Cannot castle out of check.
    if is_square_attacked(position, king_from, side.opposite()) {
        return;
    }

    if can_kingside && rook_at_home(position, side, 7, home_rank) && files_empty(position, home_rank, 5..=6) {
        if let Some(to) = Square::new(6, home_rank) {
            out.push(Move::with_flags(king_from, to, MoveFlags::CASTLE_KINGSIDE));
        }
    }

    if can_queenside && rook_at_home(position, side, 0, home_rank) && files_empty(position, home_rank, 1..=3) {
        if let Some(to) = Square::new(2, home_rank) {
            out.push(Move::with_flags(king_from, to, MoveFlags::CASTLE_QUEENSIDE));
        }
    }
}

/// Squares the king crosses or lands on for a castling move (start excluded).
pub fn castling_path(mv: &Move) -> [Option<Square>; 2] {
    let rank = mv.from.rank();
    if mv.flags.contains(MoveFlags::CASTLE_KINGSIDE) {
        [Square::new(5, rank), Square::new(6, rank)]
    } else if mv.flags.contains(MoveFlags::CASTLE_QUEENSIDE) {
        [Square::new(3, rank), Square::new(2, rank)]
    } else {
        [None, None]
    }
}

fn rook_at_home(position: &Position, side: Color, file: u8, rank: u8) -> bool {
    Square::new(file, rank)
        .is_some_and(|sq| position.pieces[side.index()][PieceKind::Rook.index()] & sq.bit() != 0)
}

fn files_empty(position: &Position, rank: u8, files: std::ops::RangeInclusive<u8>) -> bool {
    files
        .filter_map(|file| Square::new(file, rank))
        .all(|sq| position.occupancy_all & sq.bit() == 0)
}
