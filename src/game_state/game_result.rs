//! Game outcome types.

use std::fmt;

use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    FiftyMove,
    ThreefoldRepetition,
    InsufficientMaterial,
    Agreement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
    Resignation { winner: Color },
}

impl GameResult {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::Checkmate { winner } | GameResult::Resignation { winner } => Some(winner),
            _ => None,
        }
    }

    /// PGN result token: `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub fn pgn_token(self) -> &'static str {
        match self {
            GameResult::InProgress => "*",
            GameResult::Stalemate | GameResult::Draw(_) => "1/2-1/2",
            GameResult::Checkmate { winner } | GameResult::Resignation { winner } => match winner {
                Color::White => "1-0",
                Color::Black => "0-1",
            },
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DrawReason::FiftyMove => "fifty-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::Agreement => "agreement",
        })
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::InProgress => f.write_str("in progress"),
            GameResult::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameResult::Stalemate => f.write_str("stalemate"),
            GameResult::Draw(reason) => write!(f, "draw by {reason}"),
            GameResult::Resignation { winner } => write!(f, "resignation, {winner} wins"),
        }
    }
}

/// State machine phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingMove,
    GameOver(GameResult),
}

impl GamePhase {
    pub fn result(self) -> GameResult {
        match self {
            GamePhase::AwaitingMove => GameResult::InProgress,
            GamePhase::GameOver(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pgn_tokens() {
        assert_eq!(GameResult::InProgress.pgn_token(), "*");
        assert_eq!(GameResult::Checkmate { winner: Color::Black }.pgn_token(), "0-1");
        assert_eq!(GameResult::Draw(DrawReason::FiftyMove).pgn_token(), "1/2-1/2");
        assert_eq!(GameResult::Resignation { winner: Color::White }.pgn_token(), "1-0");
    }

    #[test]
    fn display_mentions_reason() {
        let text = GameResult::Draw(DrawReason::ThreefoldRepetition).to_string();
        assert_eq!(text, "draw by threefold repetition");
        assert_eq!(GamePhase::AwaitingMove.result(), GameResult::InProgress);
    }
}
