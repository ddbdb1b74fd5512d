//! Off-thread engine search.
//!
//! The worker takes ownership of the engine adapter and a snapshot of the
//! position, so the game itself is never visible to it. When the search ends
//! the adapter travels back to the caller together with the result. A
//! cancelled search still hands the adapter back; its move is discarded.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::engines::engine_adapter::EngineAdapter;
use crate::errors::ChessResult;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::search::search_control::SearchControl;

#[derive(Debug)]
pub struct SearchOutcome {
    pub adapter: EngineAdapter,
    pub position: Position,
    pub result: ChessResult<Option<Move>>,
}

#[derive(Debug)]
pub enum SearchPoll {
    Pending,
    Finished(SearchOutcome),
    /// The worker died without reporting; the adapter is gone.
    Lost,
}

#[derive(Debug)]
pub struct SearchHandle {
    control: Arc<SearchControl>,
    receiver: Receiver<SearchOutcome>,
    worker: Option<JoinHandle<()>>,
    position: Position,
}

pub fn spawn_search(mut adapter: EngineAdapter, position: Position) -> SearchHandle {
    let control = SearchControl::new();
    let (tx, rx) = mpsc::channel();

    let worker_control = Arc::clone(&control);
    let snapshot = position.clone();
    let worker = thread::spawn(move || {
        let result = adapter.suggest_move_with_control(&snapshot, &worker_control);
        let _ = tx.send(SearchOutcome {
            adapter,
            position: snapshot,
            result,
        });
    });
    debug!(fen = %position.fen(), "background search started");

    SearchHandle {
        control,
        receiver: rx,
        worker: Some(worker),
        position,
    }
}

impl SearchHandle {
    /// Position the search was started from.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn control(&self) -> &SearchControl {
        &self.control
    }

    pub fn poll(&mut self) -> SearchPoll {
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.join_worker();
                SearchPoll::Finished(outcome)
            }
            Err(TryRecvError::Empty) => SearchPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.join_worker();
                SearchPoll::Lost
            }
        }
    }

    /// Block until the worker reports.
    pub fn wait(mut self) -> SearchPoll {
        let polled = match self.receiver.recv() {
            Ok(outcome) => SearchPoll::Finished(outcome),
            Err(_) => SearchPoll::Lost,
        };
        self.join_worker();
        polled
    }

    /// Stop the search and wait for the worker to hand the adapter back.
    pub fn cancel(self) -> Option<EngineAdapter> {
        self.control.request_stop();
        match self.wait() {
            SearchPoll::Finished(outcome) => Some(outcome.adapter),
            SearchPoll::Pending | SearchPoll::Lost => None,
        }
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        // An abandoned worker winds down on its own; nobody reads its result.
        if self.worker.is_some() {
            self.control.request_stop();
        }
    }
}
