//! Immutable position snapshot.
//!
//! `Position` stores piece bitboards indexed `[color][piece_kind]`, occupancy
//! caches, side to move, castling rights, en-passant target and the two move
//! clocks. Every applied move yields a fresh `Position`; nothing mutates a
//! snapshot once it has been handed out.

use std::fmt;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::{is_square_attacked, king_square};
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::Move;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;
use crate::utils::render_game_state::render_position;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    // [color][piece_kind]
    pub(crate) pieces: [[u64; 6]; 2],
    pub(crate) occupancy_by_color: [u64; 2],
    pub(crate) occupancy_all: u64,

    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_square: Option<Square>,

    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
}

impl Default for Position {
    /// An empty board with White to move. Useful as a scratch base for FEN
    /// parsing and hand-built test positions.
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    /// The standard initial array.
    pub fn starting() -> Self {
        let mut position = Position::default();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in (0u8..).zip(back_rank) {
            for (color, back, pawns) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
                if let (Some(home), Some(pawn_home)) = (Square::new(file, back), Square::new(file, pawns)) {
                    position.pieces[color.index()][kind.index()] |= home.bit();
                    position.pieces[color.index()][PieceKind::Pawn.index()] |= pawn_home.bit();
                }
            }
        }
        position.castling_rights = CastlingRights::ALL;
        position.recalc_occupancy();
        position
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen)
    }

    pub fn fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn occupancy(&self) -> u64 {
        self.occupancy_all
    }

    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let mask = square.bit();
        if self.occupancy_all & mask == 0 {
            return None;
        }
        for color in Color::ALL {
            if self.occupancy_by_color[color.index()] & mask == 0 {
                continue;
            }
            for kind in PieceKind::ALL {
                if self.pieces[color.index()][kind.index()] & mask != 0 {
                    return Some(Piece { kind, color });
                }
            }
        }
        None
    }

    /// `None` only for hand-built positions that lack a king of `color`.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        king_square(self, color)
    }

    #[inline]
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        is_square_attacked(self, square, by)
    }

    /// True when the side to move has its king attacked.
    pub fn is_in_check(&self) -> bool {
        self.king_square(self.side_to_move)
            .is_some_and(|king| self.is_attacked(king, self.side_to_move.opposite()))
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(self)
    }

    /// The legal move matching `mv`'s action, with generator-derived flags.
    pub fn find_legal(&self, mv: &Move) -> Option<Move> {
        legal_moves(self).into_iter().find(|legal| legal.same_action(mv))
    }

    /// Validate `mv` and return the resulting position.
    pub fn play(&self, mv: &Move) -> ChessResult<Position> {
        let legal = self.find_legal(mv).ok_or(ChessError::IllegalMove { mv: *mv })?;
        Ok(apply_move(self, &legal))
    }

    /// Place `piece` on `square`, replacing whatever stood there.
    pub fn put_piece(&mut self, square: Square, piece: Piece) {
        self.clear_square(square);
        self.pieces[piece.color.index()][piece.kind.index()] |= square.bit();
        self.recalc_occupancy();
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling_rights = rights;
    }

    pub fn set_en_passant_square(&mut self, square: Option<Square>) {
        self.en_passant_square = square;
    }

    pub fn set_clocks(&mut self, halfmove_clock: u16, fullmove_number: u16) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number.max(1);
    }

    pub(crate) fn clear_square(&mut self, square: Square) {
        let mask = !square.bit();
        for color in &mut self.pieces {
            for bitboard in color.iter_mut() {
                *bitboard &= mask;
            }
        }
    }

    pub(crate) fn recalc_occupancy(&mut self) {
        for color in Color::ALL {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[Color::White.index()]
            | self.occupancy_by_color[Color::Black.index()];
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_position(self))
    }
}
