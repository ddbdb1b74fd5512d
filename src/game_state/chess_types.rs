//! Value types shared by every layer of the rules core.
//!
//! Squares, colors, piece kinds and castling rights are small `Copy` values.
//! Square indexing is `0 == a1`, `7 == h1`, `63 == h8`, matching the bitboard
//! layout used by `Position`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side to move / piece owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// Piece kind (color is stored separately in the bitboard layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Lowercase letter used by FEN and long algebraic notation.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop)
    }
}

/// A colored piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN character: uppercase for White, lowercase for Black.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else if ch.is_ascii_lowercase() {
            Color::Black
        } else {
            return None;
        };
        PieceKind::from_letter(ch).map(|kind| Piece { kind, color })
    }
}

/// Board coordinate. Always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    /// Build from file and rank (both `0..8`).
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Index taken from a non-empty bitboard's lowest set bit.
    #[inline]
    pub(crate) const fn from_lsb(bitboard: u64) -> Self {
        Square((bitboard.trailing_zeros() as u8) & 63)
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    /// Square shifted by a file/rank delta, if it stays on the board.
    #[inline]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Square((rank * 8 + file) as u8))
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file()),
            char::from(b'1' + self.rank())
        )
    }
}

/// Iterate the set squares of a bitboard, lowest first.
#[derive(Debug, Clone, Copy)]
pub struct SquareIter(u64);

impl SquareIter {
    #[inline]
    pub const fn new(bitboard: u64) -> Self {
        Self(bitboard)
    }
}

impl Iterator for SquareIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let sq = Square::from_lsb(self.0);
        self.0 &= self.0 - 1;
        Some(sq)
    }
}

/// Four independent castling flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: CastlingRights = CastlingRights(1 << 0);
    pub const WHITE_QUEENSIDE: CastlingRights = CastlingRights(1 << 1);
    pub const BLACK_KINGSIDE: CastlingRights = CastlingRights(1 << 2);
    pub const BLACK_QUEENSIDE: CastlingRights = CastlingRights(1 << 3);
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: CastlingRights) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: CastlingRights) {
        self.0 &= !other.0;
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn kingside(color: Color) -> CastlingRights {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    pub const fn queenside(color: Color) -> CastlingRights {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Right lost when the rook standing on (or captured on) `square` leaves it.
    pub const fn for_rook_home(square: Square) -> CastlingRights {
        match square.index() {
            0 => Self::WHITE_QUEENSIDE,
            7 => Self::WHITE_KINGSIDE,
            56 => Self::BLACK_QUEENSIDE,
            63 => Self::BLACK_KINGSIDE,
            _ => Self::NONE,
        }
    }
}

impl std::ops::BitOr for CastlingRights {
    type Output = CastlingRights;

    fn bitor(self, rhs: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates_and_display() {
        let e4 = Square::new(4, 3).expect("e4 is on the board");
        assert_eq!(e4.index(), 28);
        assert_eq!(e4.to_string(), "e4");
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::from_index(64), None);
        assert_eq!(Square::H8.offset(1, 0), None);
        assert_eq!(Square::A1.offset(1, 2).map(|s| s.to_string()), Some("b3".to_owned()));
    }

    #[test]
    fn square_iter_walks_set_bits() {
        let squares: Vec<_> = SquareIter::new(Square::A1.bit() | Square::H8.bit()).collect();
        assert_eq!(squares, vec![Square::A1, Square::H8]);
    }

    #[test]
    fn castling_rights_are_independent() {
        let mut rights = CastlingRights::ALL;
        rights.remove(CastlingRights::kingside(Color::White));
        assert!(!rights.contains(CastlingRights::WHITE_KINGSIDE));
        assert!(rights.contains(CastlingRights::WHITE_QUEENSIDE));
        assert!(rights.contains(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE));
        assert!(!CastlingRights::NONE.contains(CastlingRights::NONE));
    }

    #[test]
    fn fen_chars_round_trip() {
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, color);
                assert_eq!(Piece::from_fen_char(piece.fen_char()), Some(piece));
            }
        }
        assert_eq!(Piece::from_fen_char('x'), None);
    }
}
