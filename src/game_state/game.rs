//! Game state machine.
//!
//! A `Game` owns the initial position, the current position and the move
//! history. Every move passes through `apply_move`, which checks it against
//! the legal move set before anything changes; terminal conditions are
//! re-evaluated after every applied or undone move.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_LIMIT};
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::game_result::{DrawReason, GamePhase, GameResult};
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::search::zobrist::position_signature;
use crate::utils::pgn::{default_headers, read_pgn, write_pgn_with_headers};

/// One applied move together with the position it was played from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub position_before: Position,
    pub mv: Move,
}

#[derive(Debug, Clone)]
pub struct Game {
    initial: Position,
    position: Position,
    history: Vec<HistoryEntry>,
    // signatures[i] is the signature of the position after i moves.
    signatures: Vec<u64>,
    phase: GamePhase,
}

impl Default for Game {
    fn default() -> Self {
        Self::from_position(Position::starting())
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a game from an arbitrary position. The position may already be
    /// terminal (checkmate, stalemate, ...).
    pub fn from_position(position: Position) -> Self {
        let mut game = Self {
            initial: position.clone(),
            signatures: vec![position_signature(&position)],
            position,
            history: Vec::new(),
            phase: GamePhase::AwaitingMove,
        };
        game.phase = game.evaluate_phase();
        game
    }

    /// Discard the current game and start over from the standard setup.
    pub fn new_game(&mut self) -> Position {
        *self = Self::default();
        info!("new game");
        self.position.clone()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn initial_position(&self) -> &Position {
        &self.initial
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn move_list(&self) -> Vec<Move> {
        self.history.iter().map(|entry| entry.mv).collect()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|entry| entry.mv)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn game_result(&self) -> GameResult {
        self.phase.result()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Legal moves of the current position; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        match self.phase {
            GamePhase::AwaitingMove => self.position.legal_moves(),
            GamePhase::GameOver(_) => Vec::new(),
        }
    }

    /// Look up the legal move with the given coordinates.
    pub fn find_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Option<Move> {
        let wanted = Move {
            promotion,
            ..Move::new(from, to)
        };
        self.position.find_legal(&wanted)
    }

    /// Apply `mv` if it is legal in the current position.
    ///
    /// The move is matched on its coordinates and promotion piece; the stored
    /// move carries the generator's flags whatever the caller passed in.
    pub fn apply_move(&mut self, mv: Move) -> ChessResult<Position> {
        if let GamePhase::GameOver(result) = self.phase {
            return Err(ChessError::GameOver { result });
        }

        let legal = self
            .position
            .find_legal(&mv)
            .ok_or(ChessError::IllegalMove { mv })?;

        let next = crate::move_generation::legal_move_apply::apply_move(&self.position, &legal);
        let before = std::mem::replace(&mut self.position, next);
        self.history.push(HistoryEntry {
            position_before: before,
            mv: legal,
        });
        self.signatures.push(position_signature(&self.position));
        self.phase = self.evaluate_phase();

        debug!(mv = %legal, ply = self.history.len(), fen = %self.position.fen(), "move applied");
        if let GamePhase::GameOver(result) = self.phase {
            info!(%result, plies = self.history.len(), "game over");
        }

        Ok(self.position.clone())
    }

    /// Take back the last move. Any result, including a resignation or an
    /// agreed draw, is re-derived from the restored position.
    pub fn undo_move(&mut self) -> ChessResult<Position> {
        let entry = self.history.pop().ok_or(ChessError::NoHistory)?;
        self.signatures.pop();
        self.position = entry.position_before;
        self.phase = self.evaluate_phase();
        debug!(mv = %entry.mv, ply = self.history.len(), "move undone");
        Ok(self.position.clone())
    }

    pub fn agree_draw(&mut self) -> ChessResult<GameResult> {
        self.finish(GameResult::Draw(DrawReason::Agreement))
    }

    pub fn resign(&mut self, color: Color) -> ChessResult<GameResult> {
        self.finish(GameResult::Resignation {
            winner: color.opposite(),
        })
    }

    fn finish(&mut self, result: GameResult) -> ChessResult<GameResult> {
        if let GamePhase::GameOver(current) = self.phase {
            return Err(ChessError::GameOver { result: current });
        }
        self.phase = GamePhase::GameOver(result);
        info!(%result, plies = self.history.len(), "game over");
        Ok(result)
    }

    /// How many times the current position has occurred since the game began.
    pub fn repetition_count(&self) -> usize {
        let Some(current) = self.signatures.last() else {
            return 0;
        };
        self.signatures.iter().filter(|sig| *sig == current).count()
    }

    fn evaluate_phase(&self) -> GamePhase {
        let result = evaluate_result(&self.position, self.repetition_count());
        if result.is_terminal() {
            GamePhase::GameOver(result)
        } else {
            GamePhase::AwaitingMove
        }
    }

    pub fn to_pgn(&self) -> ChessResult<String> {
        self.to_pgn_with_headers(&default_headers(self.game_result().pgn_token()))
    }

    pub fn to_pgn_with_headers(&self, headers: &BTreeMap<String, String>) -> ChessResult<String> {
        let mut headers = headers.clone();
        headers.insert("Result".to_owned(), self.game_result().pgn_token().to_owned());
        write_pgn_with_headers(&self.initial, &self.move_list(), &headers)
    }

    /// Rebuild a game by replaying the PGN move list through `apply_move`.
    ///
    /// A decisive or drawn `Result` tag on a game the rules still consider in
    /// progress is restored as a resignation or an agreed draw.
    pub fn from_pgn(text: &str) -> ChessResult<Game> {
        let pgn = read_pgn(text)?;
        let mut game = Game::from_position(pgn.initial_position);
        for mv in pgn.moves {
            game.apply_move(mv)?;
        }

        if game.game_result() == GameResult::InProgress {
            match pgn.result.as_str() {
                "1-0" => {
                    game.resign(Color::Black)?;
                }
                "0-1" => {
                    game.resign(Color::White)?;
                }
                "1/2-1/2" => {
                    game.agree_draw()?;
                }
                _ => {}
            }
        }
        Ok(game)
    }
}

/// Terminal status of a position, checked in a fixed order: checkmate,
/// stalemate, fifty-move rule, repetition, insufficient material.
pub fn evaluate_result(position: &Position, repetitions: usize) -> GameResult {
    if position.legal_moves().is_empty() {
        return if position.is_in_check() {
            GameResult::Checkmate {
                winner: position.side_to_move().opposite(),
            }
        } else {
            GameResult::Stalemate
        };
    }
    if position.halfmove_clock() >= FIFTY_MOVE_HALFMOVES {
        return GameResult::Draw(DrawReason::FiftyMove);
    }
    if repetitions >= REPETITION_LIMIT {
        return GameResult::Draw(DrawReason::ThreefoldRepetition);
    }
    if is_insufficient_material(position) {
        return GameResult::Draw(DrawReason::InsufficientMaterial);
    }
    GameResult::InProgress
}

/// Only kings remain, or each side has at most one knight or bishop.
pub fn is_insufficient_material(position: &Position) -> bool {
    Color::ALL.iter().all(|&color| {
        let heavy_or_pawn = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen]
            .iter()
            .any(|&kind| position.pieces_of(color, kind) != 0);
        let minors = position.pieces_of(color, PieceKind::Knight).count_ones()
            + position.pieces_of(color, PieceKind::Bishop).count_ones();
        !heavy_or_pawn && minors <= 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::algebraic::algebraic_to_square;
    use crate::utils::long_algebraic::parse_move_coordinates;

    fn play(game: &mut Game, lans: &[&str]) {
        for lan in lans {
            let mv = parse_move_coordinates(lan).expect("LAN should parse");
            game.apply_move(mv).expect("move should be legal");
        }
    }

    #[test]
    fn new_game_offers_twenty_moves() {
        let mut game = Game::new();
        let start = game.new_game();
        assert_eq!(start, Position::starting());
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.phase(), GamePhase::AwaitingMove);
    }

    #[test]
    fn illegal_move_leaves_game_untouched() {
        let mut game = Game::new();
        let bad = parse_move_coordinates("e2e5").expect("LAN should parse");
        let err = game.apply_move(bad).expect_err("e2e5 is illegal");
        assert!(matches!(err, ChessError::IllegalMove { .. }));
        assert_eq!(game.position(), &Position::starting());
        assert!(game.history().is_empty());
    }

    #[test]
    fn apply_then_undo_restores_position() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "c7c5", "g1f3"]);
        let after_two = {
            let mut g = Game::new();
            play(&mut g, &["e2e4", "c7c5"]);
            g.position().clone()
        };
        let restored = game.undo_move().expect("history exists");
        assert_eq!(restored, after_two);
        assert_eq!(game.move_list().len(), 2);
    }

    #[test]
    fn undo_on_fresh_game_is_no_history() {
        let mut game = Game::new();
        assert!(matches!(game.undo_move(), Err(ChessError::NoHistory)));
    }

    #[test]
    fn scholars_mate_is_checkmate_and_locks_the_game() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);
        assert_eq!(game.game_result(), GameResult::Checkmate { winner: Color::White });
        assert!(game.legal_moves().is_empty());

        let any = parse_move_coordinates("a7a6").expect("LAN should parse");
        assert!(matches!(game.apply_move(any), Err(ChessError::GameOver { .. })));

        // Undo reopens the game.
        game.undo_move().expect("history exists");
        assert_eq!(game.game_result(), GameResult::InProgress);
    }

    #[test]
    fn stalemate_is_detected() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert_eq!(Game::from_position(position).game_result(), GameResult::Stalemate);
    }

    #[test]
    fn queen_and_king_mate_the_lone_king() {
        let position = Position::from_fen("k7/1Q6/2K5/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        let game = Game::from_position(position);
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.game_result(), GameResult::Checkmate { winner: Color::White });
    }

    #[test]
    fn hundred_quiet_halfmoves_is_a_fifty_move_draw() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").expect("FEN should parse");
        let mut game = Game::from_position(position);
        assert_eq!(game.game_result(), GameResult::InProgress);
        play(&mut game, &["a1a2"]);
        assert_eq!(game.position().halfmove_clock(), 100);
        assert_eq!(game.game_result(), GameResult::Draw(DrawReason::FiftyMove));
    }

    #[test]
    fn checkmate_outranks_the_fifty_move_rule() {
        let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80").expect("FEN should parse");
        let mut game = Game::from_position(position);
        play(&mut game, &["a1a8"]);
        assert_eq!(game.game_result(), GameResult::Checkmate { winner: Color::White });
    }

    #[test]
    fn knight_shuffle_draws_by_threefold_repetition() {
        let mut game = Game::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut game, &shuffle);
        assert_eq!(game.repetition_count(), 2);
        assert_eq!(game.game_result(), GameResult::InProgress);
        play(&mut game, &shuffle);
        assert_eq!(game.repetition_count(), 3);
        assert_eq!(game.game_result(), GameResult::Draw(DrawReason::ThreefoldRepetition));
    }

    #[test]
    fn insufficient_material_cases() {
        for (fen, expected) in [
            ("4k3/8/8/8/8/8/8/4K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1", true),
            ("4kn2/8/8/8/8/8/8/2B1K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/1NB1K3 w - - 0 1", false),
            ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", false),
            ("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", false),
        ] {
            let position = Position::from_fen(fen).expect("FEN should parse");
            assert_eq!(is_insufficient_material(&position), expected, "{fen}");
        }

        let mut game = Game::from_position(
            Position::from_fen("4k3/8/8/8/8/8/3q4/4K3 w - - 0 1").expect("FEN should parse"),
        );
        play(&mut game, &["e1d2"]);
        assert_eq!(game.game_result(), GameResult::Draw(DrawReason::InsufficientMaterial));
    }

    #[test]
    fn en_passant_target_set_and_cleared() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        assert_eq!(
            game.position().en_passant_square(),
            Some(algebraic_to_square("e3").expect("square"))
        );
        play(&mut game, &["g8f6"]);
        assert_eq!(game.position().en_passant_square(), None);
    }

    #[test]
    fn find_move_resolves_flags() {
        let game = Game::from_position(
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse"),
        );
        let e1 = algebraic_to_square("e1").expect("square");
        let g1 = algebraic_to_square("g1").expect("square");
        let castle = game.find_move(e1, g1, None).expect("castling is legal");
        assert!(castle.is_castle());
        assert!(game.find_move(e1, algebraic_to_square("e3").expect("square"), None).is_none());
    }

    #[test]
    fn resign_and_agree_draw_end_the_game() {
        let mut game = Game::new();
        assert_eq!(
            game.resign(Color::White).expect("game in progress"),
            GameResult::Resignation { winner: Color::Black }
        );
        assert!(matches!(game.agree_draw(), Err(ChessError::GameOver { .. })));

        let mut other = Game::new();
        play(&mut other, &["d2d4"]);
        other.agree_draw().expect("game in progress");
        assert_eq!(other.game_result(), GameResult::Draw(DrawReason::Agreement));
    }

    #[test]
    fn pgn_round_trip_replays_through_apply_move() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);
        let text = game.to_pgn().expect("PGN writes");
        assert!(text.contains("[Result \"1-0\"]"));

        let restored = Game::from_pgn(&text).expect("PGN reads");
        assert_eq!(restored.move_list(), game.move_list());
        assert_eq!(restored.position(), game.position());
        assert_eq!(restored.game_result(), game.game_result());
    }

    #[test]
    fn pgn_result_restores_resignation() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        game.resign(Color::Black).expect("game in progress");
        let restored = Game::from_pgn(&game.to_pgn().expect("PGN writes")).expect("PGN reads");
        assert_eq!(restored.game_result(), GameResult::Resignation { winner: Color::White });
    }
}
