use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::engines::engine_trait::{MoveOracle, OracleReply, SearchLimits};
use crate::errors::ChessResult;
use crate::game_state::position::Position;
use crate::search::board_scoring::PositionalScorer;
use crate::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use crate::search::search_control::SearchControl;

/// Iterative-deepening alpha-beta searcher.
///
/// With a non-zero blunder chance the oracle sometimes plays the best move of
/// the depth-1 iteration instead of the deepest one, which is how the easy
/// computer opponent loses pieces now and then.
pub struct AlphaBetaOracle {
    default_depth: u8,
    blunder_chance: f64,
    rng: StdRng,
    scorer: PositionalScorer,
}

impl AlphaBetaOracle {
    pub fn new(default_depth: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            default_depth: default_depth.max(1),
            blunder_chance: 0.0,
            rng,
            scorer: PositionalScorer,
        }
    }

    pub fn with_blunder_chance(mut self, chance: f64) -> Self {
        self.blunder_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl MoveOracle for AlphaBetaOracle {
    fn name(&self) -> &str {
        "alphabeta"
    }

    fn choose_move(
        &mut self,
        fen: &str,
        limits: &SearchLimits,
        control: &SearchControl,
    ) -> ChessResult<OracleReply> {
        let position = Position::from_fen(fen)?;
        let depth = limits.depth.unwrap_or(self.default_depth).max(1);

        control.set_time_budget(limits.movetime);
        control.start_clock();

        let result = iterative_deepening_search(
            &position,
            &self.scorer,
            SearchConfig { max_depth: depth },
            control,
        );

        let mut out = OracleReply::default();
        out.info_lines.push(format!(
            "info depth {} score cp {} nodes {} time {}",
            result.reached_depth,
            result.best_score,
            result.nodes,
            control.elapsed().as_millis()
        ));

        let mut chosen = result.best_move;
        if self.blunder_chance > 0.0 && self.rng.random_bool(self.blunder_chance) {
            if let Some(shallow) = result.shallow_best_move {
                debug!(deep = ?chosen.map(|mv| mv.to_string()), shallow = %shallow, "playing shallow move");
                out.info_lines
                    .push(format!("info string alphabeta_oracle blunder {shallow}"));
                chosen = Some(shallow);
            }
        }

        out.best_move = chosen.map(|mv| mv.to_string());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::AlphaBetaOracle;
    use crate::engines::engine_trait::{MoveOracle, SearchLimits};
    use crate::game_state::position::Position;
    use crate::search::search_control::SearchControl;
    use crate::utils::long_algebraic::parse_long_algebraic;

    #[test]
    fn finds_back_rank_mate() {
        let mut oracle = AlphaBetaOracle::new(3, Some(1));
        let reply = oracle
            .choose_move(
                "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
                &SearchLimits::default(),
                &SearchControl::new(),
            )
            .expect("oracle should reply");
        assert_eq!(reply.best_move.as_deref(), Some("a1a8"));
    }

    #[test]
    fn movetime_bounds_a_deep_search() {
        let mut oracle = AlphaBetaOracle::new(8, Some(1));
        let control = SearchControl::new();
        let limits = SearchLimits {
            depth: None,
            movetime: Some(Duration::from_millis(50)),
        };
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let reply = oracle.choose_move(fen, &limits, &control).expect("oracle should reply");

        assert!(control.elapsed() < Duration::from_secs(5));
        let position = Position::from_fen(fen).expect("FEN should parse");
        let lan = reply.best_move.expect("move expected");
        parse_long_algebraic(&lan, &position).expect("reply should be legal");
    }

    #[test]
    fn certain_blunder_plays_the_shallow_choice() {
        let mut careful = AlphaBetaOracle::new(2, Some(9));
        let mut sloppy = AlphaBetaOracle::new(2, Some(9)).with_blunder_chance(1.0);
        let fen = "4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1";
        let limits = SearchLimits::default();

        let a = careful
            .choose_move(fen, &limits, &SearchControl::new())
            .expect("oracle should reply");
        let b = sloppy
            .choose_move(fen, &limits, &SearchControl::new())
            .expect("oracle should reply");

        assert!(a.best_move.is_some());
        assert!(b.best_move.is_some());
        assert!(b.info_lines.iter().any(|line| line.contains("blunder")));
        assert!(a.info_lines.iter().all(|line| !line.contains("blunder")));
    }
}
