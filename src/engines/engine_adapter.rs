//! Engine adapter: the validation gate between a move oracle and the game.
//!
//! The adapter serializes a position to FEN, asks its oracle for a move,
//! parses the long algebraic reply and accepts it only if it names a member
//! of the position's legal move set. Anything else is reported as an
//! `EngineContractViolation` and never reaches the game.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::engines::engine_greedy::GreedyOracle;
use crate::engines::engine_iterative::AlphaBetaOracle;
use crate::engines::engine_random::RandomOracle;
use crate::engines::engine_trait::{MoveOracle, SearchLimits};
use crate::engines::engine_uci_process::UciProcessOracle;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::PieceKind;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::search::search_control::SearchControl;
use crate::utils::long_algebraic::parse_move_coordinates;

/// Default think time for a computer move.
pub const DEFAULT_THINK_TIME_MS: u64 = 1_000;

/// Chance that an easy opponent plays its depth-1 choice.
pub const EASY_BLUNDER_CHANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl SkillLevel {
    pub const fn depth(self) -> u8 {
        match self {
            SkillLevel::Easy => 2,
            SkillLevel::Medium => 3,
            SkillLevel::Hard => 8,
        }
    }

    pub const fn blunder_chance(self) -> f64 {
        match self {
            SkillLevel::Easy => EASY_BLUNDER_CHANCE,
            SkillLevel::Medium | SkillLevel::Hard => 0.0,
        }
    }

    /// Numeric level as used by the UCI `Skill Level` option (1 to 3).
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => SkillLevel::Easy,
            2 => SkillLevel::Medium,
            _ => SkillLevel::Hard,
        }
    }

    /// Inverse of `from_level`.
    pub const fn uci_level(self) -> u8 {
        match self {
            SkillLevel::Easy => 1,
            SkillLevel::Medium => 2,
            SkillLevel::Hard => 3,
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkillLevel::Easy => "easy",
            SkillLevel::Medium => "medium",
            SkillLevel::Hard => "hard",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLimit {
    /// Fixed depth, no clock.
    Depth(u8),
    /// Skill-derived depth, cut off after this many milliseconds.
    ThinkTimeMs(u64),
}

impl Default for SearchLimit {
    fn default() -> Self {
        SearchLimit::ThinkTimeMs(DEFAULT_THINK_TIME_MS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleKind {
    Random,
    Greedy,
    #[default]
    AlphaBeta,
    /// External UCI engine executable.
    Uci {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub oracle: OracleKind,
    pub skill: SkillLevel,
    pub limit: SearchLimit,
    /// Seed for the oracle's random choices; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oracle: OracleKind::default(),
            skill: SkillLevel::default(),
            limit: SearchLimit::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_skill(skill: SkillLevel) -> Self {
        Self {
            skill,
            ..Self::default()
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        match self.limit {
            SearchLimit::Depth(depth) => SearchLimits {
                depth: Some(depth.max(1)),
                movetime: None,
            },
            SearchLimit::ThinkTimeMs(ms) => SearchLimits {
                depth: Some(self.skill.depth()),
                movetime: Some(Duration::from_millis(ms.max(1))),
            },
        }
    }
}

pub fn build_oracle(config: &EngineConfig) -> ChessResult<Box<dyn MoveOracle>> {
    let oracle: Box<dyn MoveOracle> = match &config.oracle {
        OracleKind::Random => Box::new(RandomOracle::new(config.seed)),
        OracleKind::Greedy => Box::new(GreedyOracle::new(config.seed)),
        OracleKind::AlphaBeta => Box::new(
            AlphaBetaOracle::new(config.skill.depth(), config.seed)
                .with_blunder_chance(config.skill.blunder_chance()),
        ),
        OracleKind::Uci { program, args } => {
            let mut engine = UciProcessOracle::spawn(program, args)?;
            engine.set_option("Skill Level", &config.skill.uci_level().to_string())?;
            Box::new(engine)
        }
    };
    Ok(oracle)
}

pub struct EngineAdapter {
    oracle: Box<dyn MoveOracle>,
    config: EngineConfig,
}

impl fmt::Debug for EngineAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("oracle", &self.oracle.name())
            .field("config", &self.config)
            .finish()
    }
}

impl EngineAdapter {
    pub fn from_config(config: EngineConfig) -> ChessResult<Self> {
        let oracle = build_oracle(&config)?;
        info!(oracle = oracle.name(), skill = %config.skill, "engine ready");
        Ok(Self { oracle, config })
    }

    /// Wrap an already-built oracle.
    pub fn new(oracle: Box<dyn MoveOracle>, config: EngineConfig) -> Self {
        Self { oracle, config }
    }

    pub fn name(&self) -> &str {
        self.oracle.name()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn new_game(&mut self) {
        self.oracle.new_game();
    }

    /// Replace the search limit used for subsequent requests.
    pub fn set_limit(&mut self, limit: SearchLimit) {
        self.config.limit = limit;
    }

    /// Ask the oracle for a move in `position`.
    ///
    /// Returns `Ok(None)` only when the position has no legal moves.
    pub fn suggest_move(&mut self, position: &Position) -> ChessResult<Option<Move>> {
        let control = SearchControl::new();
        self.suggest_move_with_control(position, &control)
    }

    pub fn suggest_move_with_control(
        &mut self,
        position: &Position,
        control: &SearchControl,
    ) -> ChessResult<Option<Move>> {
        let fen = position.fen();
        let legal = position.legal_moves();
        let limits = self.config.search_limits();

        debug!(%fen, oracle = self.oracle.name(), "engine request");
        let reply = self.oracle.choose_move(&fen, &limits, control)?;
        for line in &reply.info_lines {
            debug!(line = line.as_str(), "engine info");
        }

        if control.stop_requested() {
            return Err(ChessError::SearchCancelled);
        }

        let Some(lan) = reply.best_move else {
            if legal.is_empty() {
                return Ok(None);
            }
            return Err(violation(&fen, "no move returned while legal moves exist".to_owned()));
        };
        debug!(lan = lan.as_str(), "engine reply");

        let candidate = parse_move_coordinates(&lan)
            .map_err(|err| violation(&fen, format!("unparsable move '{lan}': {err}")))?;

        if let Some(mv) = legal.iter().find(|mv| mv.same_action(&candidate)) {
            return Ok(Some(*mv));
        }

        // A promoting pawn move sent without a piece letter becomes a queen.
        if candidate.promotion.is_none() {
            let queened = Move {
                promotion: Some(PieceKind::Queen),
                ..candidate
            };
            if let Some(mv) = legal.iter().find(|mv| mv.same_action(&queened)) {
                debug!(lan = lan.as_str(), "promotion piece missing, promoting to queen");
                return Ok(Some(*mv));
            }
        }

        Err(violation(&fen, format!("move '{lan}' is not legal")))
    }
}

fn violation(fen: &str, reason: String) -> ChessError {
    error!(fen, reason = reason.as_str(), "engine contract violation");
    ChessError::EngineContractViolation {
        fen: fen.to_owned(),
        reason,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engines::engine_trait::OracleReply;

    /// Oracle that replays canned answers, for exercising the validation gate.
    pub(crate) struct ScriptedOracle {
        pub replies: Vec<Option<String>>,
    }

    impl MoveOracle for ScriptedOracle {
        fn name(&self) -> &str {
            "scripted"
        }

        fn choose_move(
            &mut self,
            _fen: &str,
            _limits: &SearchLimits,
            _control: &SearchControl,
        ) -> ChessResult<OracleReply> {
            let next = if self.replies.is_empty() {
                None
            } else {
                self.replies.remove(0)
            };
            Ok(OracleReply {
                best_move: next,
                info_lines: Vec::new(),
            })
        }
    }

    pub(crate) fn scripted(replies: &[Option<&str>]) -> EngineAdapter {
        let oracle = ScriptedOracle {
            replies: replies.iter().map(|r| r.map(str::to_owned)).collect(),
        };
        EngineAdapter::new(Box::new(oracle), EngineConfig::default())
    }

    #[test]
    fn legal_reply_is_returned_with_flags() {
        let mut adapter = scripted(&[Some("e2e4")]);
        let mv = adapter
            .suggest_move(&Position::starting())
            .expect("legal reply accepted")
            .expect("move expected");
        assert_eq!(mv.to_string(), "e2e4");
        assert!(mv.is_double_pawn_push());
    }

    #[test]
    fn illegal_or_garbage_reply_is_a_contract_violation() {
        for reply in ["e2e5", "zz99", "e1g1"] {
            let mut adapter = scripted(&[Some(reply)]);
            let err = adapter
                .suggest_move(&Position::starting())
                .expect_err("bad reply must be rejected");
            assert!(matches!(err, ChessError::EngineContractViolation { .. }), "{reply}: {err}");
        }
    }

    #[test]
    fn no_move_while_legal_moves_exist_is_a_violation() {
        let mut adapter = scripted(&[None]);
        let err = adapter
            .suggest_move(&Position::starting())
            .expect_err("missing move must be rejected");
        assert!(matches!(err, ChessError::EngineContractViolation { .. }));
    }

    #[test]
    fn no_move_in_terminal_position_is_the_sentinel() {
        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        let mut adapter = scripted(&[None]);
        assert_eq!(adapter.suggest_move(&stalemate).expect("sentinel"), None);
    }

    #[test]
    fn missing_promotion_letter_defaults_to_queen() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("FEN should parse");
        let mut adapter = scripted(&[Some("a7a8")]);
        let mv = adapter
            .suggest_move(&position)
            .expect("reply accepted")
            .expect("move expected");
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
    }

    #[test]
    fn built_in_oracles_always_suggest_legal_moves() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
        ];
        for oracle in [OracleKind::Random, OracleKind::Greedy, OracleKind::AlphaBeta] {
            let config = EngineConfig {
                oracle,
                skill: SkillLevel::Easy,
                limit: SearchLimit::Depth(2),
                seed: Some(11),
            };
            let mut adapter = EngineAdapter::from_config(config).expect("built-in oracle builds");
            for fen in fens {
                let position = Position::from_fen(fen).expect("FEN should parse");
                let mv = adapter
                    .suggest_move(&position)
                    .expect("oracle honours the contract")
                    .expect("position has moves");
                assert!(position.legal_moves().contains(&mv), "{} suggested {mv}", adapter.name());
            }
        }
    }

    #[test]
    fn cancelled_search_reports_cancellation() {
        let mut adapter = scripted(&[Some("e2e4")]);
        let control = SearchControl::new();
        control.request_stop();
        let err = adapter
            .suggest_move_with_control(&Position::starting(), &control)
            .expect_err("stopped search is cancelled");
        assert!(matches!(err, ChessError::SearchCancelled));
    }

    #[test]
    fn skill_levels_map_to_search_limits() {
        assert_eq!(SkillLevel::Easy.depth(), 2);
        assert_eq!(SkillLevel::Medium.depth(), 3);
        assert_eq!(SkillLevel::Hard.depth(), 8);
        assert_eq!(SkillLevel::from_level(3), SkillLevel::Hard);

        let limits = EngineConfig::with_skill(SkillLevel::Hard).search_limits();
        assert_eq!(limits.depth, Some(8));
        assert_eq!(limits.movetime, Some(Duration::from_millis(DEFAULT_THINK_TIME_MS)));
    }

    #[test]
    fn uci_skill_level_round_trips() {
        for skill in [SkillLevel::Easy, SkillLevel::Medium, SkillLevel::Hard] {
            assert_eq!(SkillLevel::from_level(skill.uci_level()), skill, "{skill}");
        }
        assert_eq!(SkillLevel::Easy.uci_level(), 1);
        assert_eq!(SkillLevel::Hard.uci_level(), 3);
    }

    #[test]
    fn engine_config_reads_from_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            skill = "easy"
            seed = 5
            limit = { depth = 2 }
            oracle = { kind = "uci", program = "stockfish" }
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.skill, SkillLevel::Easy);
        assert_eq!(config.limit, SearchLimit::Depth(2));
        assert_eq!(
            config.oracle,
            OracleKind::Uci {
                program: "stockfish".to_owned(),
                args: Vec::new()
            }
        );
    }
}
