//! Perft node counting for validating the move generator.
//!
//! Counts leaf nodes of the legal move tree to a fixed depth, with a
//! breakdown of special moves at the leaves. The threaded variant splits the
//! root moves across OS threads.

use std::thread;

use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::{legal_moves, legal_moves_with_positions};
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
    }

    fn leaf(mv: &Move, next: &Position) -> Self {
        PerftCounts {
            nodes: 1,
            captures: u64::from(mv.is_capture()),
            en_passant: u64::from(mv.is_en_passant()),
            castles: u64::from(mv.is_castle()),
            promotions: u64::from(mv.promotion.is_some()),
            checks: u64::from(next.is_in_check()),
        }
    }
}

/// Leaf count only; the fast path used by benchmarks.
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    if depth == 1 {
        return legal_moves(position).len() as u64;
    }
    legal_moves_with_positions(position)
        .iter()
        .map(|(_, next)| perft(next, depth - 1))
        .sum()
}

pub fn perft_detailed(position: &Position, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for (mv, next) in legal_moves_with_positions(position) {
        if depth == 1 {
            total.merge(PerftCounts::leaf(&mv, &next));
        } else {
            total.merge(perft_detailed(&next, depth - 1));
        }
    }
    total
}

/// Per-root-move leaf counts, sorted by move text ("divide").
pub fn perft_divide(position: &Position, depth: u8) -> Vec<(Move, u64)> {
    let mut out: Vec<(Move, u64)> = legal_moves_with_positions(position)
        .into_iter()
        .map(|(mv, next)| (mv, perft(&next, depth.saturating_sub(1))))
        .collect();
    out.sort_by_key(|(mv, _)| mv.to_string());
    out
}

pub fn perft_multi_threaded(position: &Position, depth: u8) -> u64 {
    if depth <= 1 {
        return perft(position, depth);
    }

    let handles: Vec<_> = legal_moves_with_positions(position)
        .into_iter()
        .map(|(_, next)| thread::spawn(move || perft(&next, depth - 1)))
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or(0))
        .sum()
}
