//! Move descriptions.
//!
//! A `Move` names an action (`from`, `to`, optional promotion) plus flags the
//! generator derives from the position it was produced for. Moves are pure
//! data; `move_generation::legal_move_apply` turns them into new positions.

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};

/// Special-move flags carried by a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1 << 1);
    pub const CASTLE_KINGSIDE: MoveFlags = MoveFlags(1 << 2);
    pub const CASTLE_QUEENSIDE: MoveFlags = MoveFlags(1 << 3);
    pub const DOUBLE_PAWN_PUSH: MoveFlags = MoveFlags(1 << 4);

    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn union(self, other: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = MoveFlags;

    fn bitor(self, rhs: MoveFlags) -> MoveFlags {
        self.union(rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub flags: MoveFlags,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            flags: MoveFlags::NONE,
        }
    }

    #[inline]
    pub const fn with_flags(from: Square, to: Square, flags: MoveFlags) -> Self {
        Self {
            from,
            to,
            promotion: None,
            flags,
        }
    }

    #[inline]
    pub const fn promoting(from: Square, to: Square, promotion: PieceKind, flags: MoveFlags) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
            flags,
        }
    }

    /// True when both moves describe the same action, whatever their flags.
    #[inline]
    pub fn same_action(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLE_KINGSIDE) || self.flags.contains(MoveFlags::CASTLE_QUEENSIDE)
    }

    #[inline]
    pub const fn is_double_pawn_push(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH)
    }
}

/// Long algebraic form (`e2e4`, `e7e8q`), the format UCI engines speak.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.letter())?;
        }
        Ok(())
    }
}
