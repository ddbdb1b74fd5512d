//! Move oracle abstraction.
//!
//! An oracle receives a position as FEN and replies with a move in long
//! algebraic notation, or with no move. That text boundary is all the rest of
//! the crate relies on, so in-process searchers and external UCI engines are
//! interchangeable behind a single trait object.

use std::time::Duration;

use crate::errors::ChessResult;
use crate::search::search_control::SearchControl;

/// Per-request search limits handed to an oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub movetime: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct OracleReply {
    /// Chosen move in long algebraic notation (`e2e4`, `e7e8q`).
    pub best_move: Option<String>,
    pub info_lines: Vec<String>,
}

impl OracleReply {
    pub fn with_move(lan: impl Into<String>) -> Self {
        Self {
            best_move: Some(lan.into()),
            info_lines: Vec::new(),
        }
    }

    pub fn no_move() -> Self {
        Self::default()
    }
}

pub trait MoveOracle: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    /// Choose a move for the side to move in `fen`. Implementations poll
    /// `control` and stop early when it asks them to.
    fn choose_move(
        &mut self,
        fen: &str,
        limits: &SearchLimits,
        control: &SearchControl,
    ) -> ChessResult<OracleReply>;
}
