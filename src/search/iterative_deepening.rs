//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Searches depth 1, 2, ... up to the configured limit, keeping the best
//! move of the last fully completed iteration. The shared `SearchControl` is
//! polled at every node; when it trips, the partial iteration is discarded.

use tracing::debug;

use crate::game_state::{chess_types::PieceKind, position::Position};
use crate::move_generation::legal_move_generator::legal_moves_with_positions;
use crate::moves::chess_move::Move;
use crate::search::board_scoring::{BoardScorer, MaterialScorer, MATE_SCORE};
use crate::search::search_control::SearchControl;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_depth: 4 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    /// Best move of the depth-1 iteration; weaker players sometimes play it.
    pub shallow_best_move: Option<Move>,
    /// The control tripped before `max_depth` completed.
    pub aborted: bool,
}

pub fn iterative_deepening_search<S: BoardScorer>(
    position: &Position,
    scorer: &S,
    config: SearchConfig,
    control: &SearchControl,
) -> SearchResult {
    let children = ordered_children(position, None);

    if config.max_depth == 0 || children.is_empty() {
        return SearchResult {
            best_move: None,
            best_score: if children.is_empty() {
                terminal_score(position, 0)
            } else {
                scorer.score(position)
            },
            reached_depth: 0,
            nodes: 1,
            ..SearchResult::default()
        };
    }

    // A move is always available even if the first iteration never finishes.
    let mut result = SearchResult {
        best_move: children.first().map(|(mv, _)| *mv),
        ..SearchResult::default()
    };

    for depth in 1..=config.max_depth {
        let root = ordered_children(position, result.best_move);
        match negamax_root(&root, scorer, depth, control) {
            Some((best_move, best_score)) => {
                result.best_move = Some(best_move);
                result.best_score = best_score;
                result.reached_depth = depth;
                if depth == 1 {
                    result.shallow_best_move = Some(best_move);
                }
                debug!(depth, score = best_score, best = %best_move, "search iteration complete");
                if best_score.abs() >= MATE_SCORE - i32::from(depth) {
                    break;
                }
            }
            None => {
                result.aborted = true;
                break;
            }
        }
    }

    result.nodes = control.nodes_visited();
    result
}

fn negamax_root<S: BoardScorer>(
    children: &[(Move, Position)],
    scorer: &S,
    depth: u8,
    control: &SearchControl,
) -> Option<(Move, i32)> {
    let mut alpha = -MATE_SCORE;
    let beta = MATE_SCORE;
    let mut best: Option<(Move, i32)> = None;

    for (mv, next) in children {
        let score = -negamax(next, scorer, depth - 1, -beta, -alpha, 1, control)?;

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((*mv, score));
        }
        if score > alpha {
            alpha = score;
        }
    }

    best
}

fn negamax<S: BoardScorer>(
    position: &Position,
    scorer: &S,
    depth: u8,
    mut alpha: i32,
    beta: i32,
    ply: u8,
    control: &SearchControl,
) -> Option<i32> {
    if control.bump_nodes_and_check(1) {
        return None;
    }

    let children = ordered_children(position, None);
    // Terminal positions must dominate material even at the horizon.
    if children.is_empty() {
        return Some(terminal_score(position, ply));
    }
    if depth == 0 {
        return Some(scorer.score(position));
    }

    let mut best = -MATE_SCORE;

    for (_, next) in &children {
        let score = -negamax(next, scorer, depth - 1, -beta, -alpha, ply.saturating_add(1), control)?;

        if score > best {
            best = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    Some(best)
}

/// Legal children, captures first (most valuable victim, least valuable
/// attacker), with `first` moved to the front when present.
fn ordered_children(position: &Position, first: Option<Move>) -> Vec<(Move, Position)> {
    let mut children = legal_moves_with_positions(position);
    children.sort_by_cached_key(|(mv, _)| {
        if first.is_some_and(|f| f.same_action(mv)) {
            return i32::MIN;
        }
        -capture_order_key(position, mv)
    });
    children
}

fn capture_order_key(position: &Position, mv: &Move) -> i32 {
    let promotion_bonus = mv.promotion.map_or(0, MaterialScorer::piece_value);
    if !mv.is_capture() {
        return promotion_bonus;
    }
    let victim = if mv.is_en_passant() {
        MaterialScorer::piece_value(PieceKind::Pawn)
    } else {
        position
            .piece_at(mv.to)
            .map_or(0, |piece| MaterialScorer::piece_value(piece.kind))
    };
    let attacker = match position.piece_at(mv.from).map(|piece| piece.kind) {
        Some(PieceKind::King) => 2_000,
        Some(kind) => MaterialScorer::piece_value(kind),
        None => 0,
    };
    10_000 + victim * 10 - attacker / 10 + promotion_bonus
}

fn terminal_score(position: &Position, ply: u8) -> i32 {
    if position.is_in_check() {
        -MATE_SCORE + i32::from(ply)
    } else {
        0
    }
}
