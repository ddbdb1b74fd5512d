//! Errors used throughout the crate.
//!
//! `ChessError` is the single error type returned by the game state machine,
//! the notation parsers, the engine adapter and the session controller. The
//! board model and move generator are total and never produce one.
//!
//! Recoverable, caller-facing variants: `IllegalMove`, `NoHistory`,
//! `GameOver`, `NotPlayersTurn`, and the parse errors. `EngineContractViolation`
//! marks a defect at the oracle boundary; the game is never mutated by the
//! offending reply.

use thiserror::Error;

use crate::game_state::chess_types::Color;
use crate::game_state::game_result::GameResult;
use crate::moves::chess_move::Move;

#[derive(Error, Debug)]
pub enum ChessError {
    /// The move is not a member of the legal move set of the current position.
    #[error("illegal move {mv}")]
    IllegalMove { mv: Move },

    /// Undo requested at the start of the game.
    #[error("no move to undo")]
    NoHistory,

    /// The game has ended; no further moves are accepted.
    #[error("game is over: {result}")]
    GameOver { result: GameResult },

    /// A move was submitted for a side that is not controlled by the caller.
    #[error("it is not {color}'s turn to move from this input")]
    NotPlayersTurn { color: Color },

    /// The move oracle replied with something outside the legal move set.
    #[error("engine contract violation for position '{fen}': {reason}")]
    EngineContractViolation { fen: String, reason: String },

    /// A background search was cancelled before it produced a move.
    #[error("search cancelled")]
    SearchCancelled,

    /// A search is already running for this game.
    #[error("a search is already in progress")]
    SearchInProgress,

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("invalid PGN: {0}")]
    InvalidPgn(String),

    /// The oracle itself failed (process died, protocol error, ...).
    #[error("move oracle failure: {0}")]
    Oracle(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ChessResult<T> = Result<T, ChessError>;
