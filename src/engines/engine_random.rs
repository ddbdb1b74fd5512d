//! Random-move oracle.
//!
//! Selects uniformly from legal moves and is primarily used for diagnostics,
//! integration testing, and the weakest computer opponent.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{MoveOracle, OracleReply, SearchLimits};
use crate::errors::ChessResult;
use crate::game_state::position::Position;
use crate::search::search_control::SearchControl;

pub struct RandomOracle {
    rng: StdRng,
}

impl RandomOracle {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MoveOracle for RandomOracle {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(
        &mut self,
        fen: &str,
        limits: &SearchLimits,
        _control: &SearchControl,
    ) -> ChessResult<OracleReply> {
        let position = Position::from_fen(fen)?;
        let legal_moves = position.legal_moves();

        let mut out = OracleReply::default();
        out.info_lines.push(format!(
            "info string random_oracle legal_moves {}",
            legal_moves.len()
        ));
        if let Some(depth) = limits.depth {
            out.info_lines
                .push(format!("info string random_oracle requested_depth {depth}"));
        }

        out.best_move = legal_moves
            .as_slice()
            .choose(&mut self.rng)
            .map(|mv| mv.to_string());
        Ok(out)
    }
}
