use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{MoveOracle, OracleReply, SearchLimits};
use crate::errors::ChessResult;
use crate::game_state::chess_types::PieceKind;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::legal_moves_with_positions;
use crate::search::board_scoring::MaterialScorer;
use crate::search::search_control::SearchControl;

/// Plays the most valuable immediate capture (checkmate outranks
/// everything), breaking ties at random.
pub struct GreedyOracle {
    rng: StdRng,
}

impl GreedyOracle {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }
}

impl Default for GreedyOracle {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MoveOracle for GreedyOracle {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_move(
        &mut self,
        fen: &str,
        _limits: &SearchLimits,
        _control: &SearchControl,
    ) -> ChessResult<OracleReply> {
        let position = Position::from_fen(fen)?;
        let legal_moves = legal_moves_with_positions(&position);

        let mut out = OracleReply::default();
        out.info_lines.push(format!(
            "info string greedy_oracle legal_moves {}",
            legal_moves.len()
        ));

        let mut best_value = i32::MIN;
        let mut best_moves = Vec::new();

        for (mv, next) in &legal_moves {
            let value = if next.is_in_check() && next.legal_moves().is_empty() {
                i32::MAX
            } else if mv.is_en_passant() {
                MaterialScorer::piece_value(PieceKind::Pawn)
            } else {
                position
                    .piece_at(mv.to)
                    .map_or(0, |piece| MaterialScorer::piece_value(piece.kind))
            };

            if value > best_value {
                best_value = value;
                best_moves.clear();
                best_moves.push(*mv);
            } else if value == best_value {
                best_moves.push(*mv);
            }
        }

        if let Some(picked) = best_moves.as_slice().choose(&mut self.rng) {
            out.info_lines
                .push(format!("info string greedy_oracle capture_score {best_value}"));
            out.best_move = Some(picked.to_string());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::GreedyOracle;
    use crate::engines::engine_trait::{MoveOracle, SearchLimits};
    use crate::search::search_control::SearchControl;

    fn pick(fen: &str) -> Option<String> {
        let mut oracle = GreedyOracle::new(Some(3));
        oracle
            .choose_move(fen, &SearchLimits::default(), &SearchControl::new())
            .expect("oracle should reply")
            .best_move
    }

    #[test]
    fn takes_the_queen_over_the_knight() {
        // Rook on d1 can take the queen on d7 or the knight on a1.
        assert_eq!(
            pick("4k3/3q4/8/8/8/8/8/n2RK3 w - - 0 1").as_deref(),
            Some("d1d7")
        );
    }

    #[test]
    fn prefers_mate_to_material() {
        // Rook to a8 mates; taking the knight on b1 wins material instead.
        assert_eq!(
            pick("6k1/5ppp/8/8/8/8/8/Rn4K1 w - - 0 1").as_deref(),
            Some("a1a8")
        );
    }
}
