//! Session controller.
//!
//! Drives one game between two players. Human moves arrive through
//! `submit_move`; computer moves come from the side's `EngineAdapter`, either
//! synchronously (`play_computer_turn`) or on a worker thread
//! (`start_computer_turn` + `poll_computer_turn`). While a search is running
//! the game is frozen: human input is refused and undo, resign, draw and
//! new-game requests cancel the search first.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::engines::background_search::{spawn_search, SearchHandle, SearchPoll};
use crate::engines::engine_adapter::EngineAdapter;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::game_state::game::Game;
use crate::game_state::game_result::{GamePhase, GameResult};
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::session::player::{Player, SessionConfig};
use crate::utils::pgn::default_headers;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    NewGame {
        position: Position,
    },
    MoveApplied {
        color: Color,
        mv: Move,
        by_computer: bool,
        position: Position,
    },
    MoveRejected {
        mv: Move,
        reason: String,
    },
    EngineFailed {
        color: Color,
        reason: String,
    },
    /// The last half-move was taken back; `position` is the restored one.
    MoveUndone {
        position: Position,
    },
    GameOver {
        result: GameResult,
    },
}

/// State of an off-thread computer turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputerTurn {
    /// No search is running.
    Idle,
    Thinking,
    Played(Move),
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    game: Game,
    engines: [Option<EngineAdapter>; 2],
    pending: Option<SearchHandle>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl Session {
    /// Build a session, creating an engine adapter for every computer player.
    pub fn new(config: SessionConfig) -> ChessResult<Self> {
        let mut engines: [Option<EngineAdapter>; 2] = [None, None];
        for color in Color::ALL {
            if let Some(engine_config) = config.player(color).engine_config() {
                engines[color.index()] = Some(EngineAdapter::from_config(engine_config.clone())?);
            }
        }
        Ok(Self::with_engines(config, engines))
    }

    /// Build a session around adapters the caller already owns, indexed by color.
    pub fn with_engines(config: SessionConfig, engines: [Option<EngineAdapter>; 2]) -> Self {
        Self {
            config,
            game: Game::new(),
            engines,
            pending: None,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn position(&self) -> &Position {
        self.game.position()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn new_game(&mut self) -> Position {
        self.discard_search();
        let position = self.game.new_game();
        for engine in self.engines.iter_mut().flatten() {
            engine.new_game();
        }
        self.emit(SessionEvent::NewGame {
            position: position.clone(),
        });
        position
    }

    /// Replace the current game with one restored from PGN text.
    pub fn load_pgn(&mut self, text: &str) -> ChessResult<Position> {
        let game = Game::from_pgn(text)?;
        self.discard_search();
        self.game = game;
        for engine in self.engines.iter_mut().flatten() {
            engine.new_game();
        }
        info!(plies = self.game.history().len(), "game loaded");
        Ok(self.game.position().clone())
    }

    pub fn to_pgn(&self) -> ChessResult<String> {
        let mut headers: BTreeMap<String, String> = default_headers(self.game_result().pgn_token());
        headers.insert("White".to_owned(), self.config.white.to_string());
        headers.insert("Black".to_owned(), self.config.black.to_string());
        self.game.to_pgn_with_headers(&headers)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_computing() {
            return Vec::new();
        }
        self.game.legal_moves()
    }

    pub fn active_color(&self) -> Color {
        self.game.side_to_move()
    }

    pub fn active_player(&self) -> &Player {
        self.config.player(self.active_color())
    }

    pub fn game_result(&self) -> GameResult {
        self.game.game_result()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.game.last_move()
    }

    /// Most recent move in the history played by a computer side.
    pub fn last_computer_move(&self) -> Option<Move> {
        self.game
            .history()
            .iter()
            .rev()
            .find(|entry| {
                self.config
                    .player(entry.position_before.side_to_move())
                    .is_computer()
            })
            .map(|entry| entry.mv)
    }

    pub fn is_computing(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a move for the human player whose turn it is.
    pub fn submit_move(&mut self, mv: Move) -> ChessResult<Position> {
        self.ensure_in_progress()?;
        if self.is_computing() {
            return Err(ChessError::SearchInProgress);
        }
        let color = self.active_color();
        if !self.active_player().is_human() {
            return Err(ChessError::NotPlayersTurn { color });
        }
        self.commit(color, mv, false)
    }

    /// Ask the active computer player for a move and apply it, blocking until
    /// the search is done.
    pub fn play_computer_turn(&mut self) -> ChessResult<Option<Move>> {
        let color = self.computer_to_move()?;
        let position = self.game.position().clone();
        let engine = self.engines[color.index()]
            .as_mut()
            .ok_or(ChessError::NotPlayersTurn { color })?;
        let suggested = engine.suggest_move(&position);
        self.settle_search(color, suggested)
    }

    /// Start the active computer player's search on a worker thread.
    pub fn start_computer_turn(&mut self) -> ChessResult<()> {
        let color = self.computer_to_move()?;
        let engine = self.engines[color.index()]
            .take()
            .ok_or(ChessError::NotPlayersTurn { color })?;
        self.pending = Some(spawn_search(engine, self.game.position().clone()));
        Ok(())
    }

    /// Check on the running search and apply its move once it arrives.
    pub fn poll_computer_turn(&mut self) -> ChessResult<ComputerTurn> {
        let Some(handle) = self.pending.as_mut() else {
            return Ok(ComputerTurn::Idle);
        };
        let color = handle.position().side_to_move();
        match handle.poll() {
            SearchPoll::Pending => Ok(ComputerTurn::Thinking),
            SearchPoll::Finished(outcome) => {
                self.pending = None;
                self.engines[color.index()] = Some(outcome.adapter);
                if &outcome.position != self.game.position() {
                    warn!("search finished on a stale position; discarding its move");
                    return Err(ChessError::SearchCancelled);
                }
                match self.settle_search(color, outcome.result)? {
                    Some(mv) => Ok(ComputerTurn::Played(mv)),
                    None => Ok(ComputerTurn::Idle),
                }
            }
            SearchPoll::Lost => {
                self.pending = None;
                let reason = "search worker exited without a result".to_owned();
                self.restore_engine(color);
                self.emit(SessionEvent::EngineFailed {
                    color,
                    reason: reason.clone(),
                });
                Err(ChessError::Oracle(reason))
            }
        }
    }

    /// Abort a running search. The game is left exactly as it was. Returns
    /// whether a search was running.
    pub fn cancel_computer_turn(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        let color = handle.position().side_to_move();
        match handle.cancel() {
            Some(adapter) => self.engines[color.index()] = Some(adapter),
            None => self.restore_engine(color),
        }
        info!(%color, "computer turn cancelled");
        true
    }

    pub fn undo_move(&mut self) -> ChessResult<Position> {
        self.discard_search();
        let position = self.game.undo_move()?;
        self.emit(SessionEvent::MoveUndone {
            position: position.clone(),
        });
        Ok(position)
    }

    pub fn agree_draw(&mut self) -> ChessResult<GameResult> {
        self.discard_search();
        let result = self.game.agree_draw()?;
        self.emit(SessionEvent::GameOver { result });
        Ok(result)
    }

    pub fn resign(&mut self, color: Color) -> ChessResult<GameResult> {
        self.discard_search();
        let result = self.game.resign(color)?;
        self.emit(SessionEvent::GameOver { result });
        Ok(result)
    }

    fn ensure_in_progress(&self) -> ChessResult<()> {
        match self.game.phase() {
            GamePhase::AwaitingMove => Ok(()),
            GamePhase::GameOver(result) => Err(ChessError::GameOver { result }),
        }
    }

    fn computer_to_move(&self) -> ChessResult<Color> {
        self.ensure_in_progress()?;
        if self.is_computing() {
            return Err(ChessError::SearchInProgress);
        }
        let color = self.active_color();
        if !self.active_player().is_computer() {
            return Err(ChessError::NotPlayersTurn { color });
        }
        Ok(color)
    }

    fn settle_search(&mut self, color: Color, suggested: ChessResult<Option<Move>>) -> ChessResult<Option<Move>> {
        match suggested {
            Ok(Some(mv)) => {
                self.commit(color, mv, true)?;
                Ok(Some(mv))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                if !matches!(err, ChessError::SearchCancelled) {
                    self.emit(SessionEvent::EngineFailed {
                        color,
                        reason: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    fn commit(&mut self, color: Color, mv: Move, by_computer: bool) -> ChessResult<Position> {
        let position = match self.game.apply_move(mv) {
            Ok(position) => position,
            Err(err) => {
                warn!(%mv, %err, "move rejected");
                self.emit(SessionEvent::MoveRejected {
                    mv,
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        // The stored move carries generator flags; report that one.
        let applied = self.game.last_move().unwrap_or(mv);
        debug!(%color, mv = %applied, by_computer, "session move");
        self.emit(SessionEvent::MoveApplied {
            color,
            mv: applied,
            by_computer,
            position: position.clone(),
        });
        if let GamePhase::GameOver(result) = self.game.phase() {
            self.emit(SessionEvent::GameOver { result });
        }
        Ok(position)
    }

    fn discard_search(&mut self) {
        self.cancel_computer_turn();
    }

    // Rebuild an adapter lost with its worker thread.
    fn restore_engine(&mut self, color: Color) {
        let Some(engine_config) = self.config.player(color).engine_config() else {
            return;
        };
        match EngineAdapter::from_config(engine_config.clone()) {
            Ok(adapter) => self.engines[color.index()] = Some(adapter),
            Err(err) => warn!(%color, %err, "could not rebuild engine"),
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
