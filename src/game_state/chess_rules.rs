//! Canonical chess-rule constants.
//!
//! Static literals shared by position setup, the game state machine and the
//! draw rules.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-moves without a pawn move or capture that end the game in a draw.
pub const FIFTY_MOVE_HALFMOVES: u16 = 100;

/// Occurrences of the same position that end the game in a draw.
pub const REPETITION_LIMIT: usize = 3;
