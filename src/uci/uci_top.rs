//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, keeps the current position, routes `go` requests
//! through the engine adapter and emits protocol-compliant output. Every
//! `bestmove` printed here has already passed the adapter's legality check.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::engines::engine_adapter::{EngineAdapter, EngineConfig, OracleKind, SearchLimit, SkillLevel};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::game_state::position::Position;
use crate::search::search_control::SearchControl;
use crate::utils::long_algebraic::parse_long_algebraic;

const UCI_ENGINE_NAME: &str = "Chess Session";
const UCI_ENGINE_AUTHOR: &str = "chess_session developers";

/// Moves assumed left in the game when the GUI sends a clock without `movestogo`.
const DEFAULT_MOVES_TO_GO: u64 = 30;

pub fn run_stdio_loop(config: EngineConfig) -> ChessResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new(config)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

/// Parameters of a `go` command that this front-end honours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u16>,
}

struct UciState {
    position: Position,
    config: EngineConfig,
    adapter: EngineAdapter,
    debug_mode: bool,
}

impl UciState {
    fn new(config: EngineConfig) -> ChessResult<Self> {
        let adapter = EngineAdapter::from_config(config.clone())?;
        Ok(Self {
            position: Position::starting(),
            config,
            adapter,
            debug_mode: false,
        })
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        debug!(command = trimmed, "uci in");

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "uci" => {
                writeln!(out, "id name {}", UCI_ENGINE_NAME)?;
                writeln!(out, "id author {}", UCI_ENGINE_AUTHOR)?;
                writeln!(out, "option name Skill Level type spin default 2 min 1 max 3")?;
                writeln!(out, "option name Depth type spin default 0 min 0 max 64")?;
                writeln!(out, "option name MoveTime type spin default 1000 min 1 max 600000")?;
                writeln!(
                    out,
                    "option name Oracle type combo default alphabeta var random var greedy var alphabeta"
                )?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    warn!(%err, "setoption rejected");
                    writeln!(out, "info string setoption error: {}", err)?;
                }
            }
            "ucinewgame" => {
                self.position = Position::starting();
                self.adapter.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    warn!(%err, "position rejected");
                    writeln!(out, "info string position error: {}", err)?;
                }
            }
            "go" => {
                if let Err(err) = self.handle_go(trimmed, out) {
                    writeln!(out, "info string go error: {}", err)?;
                    writeln!(out, "bestmove 0000")?;
                }
            }
            "debug" => {
                let mode = parts.next().unwrap_or_default();
                self.debug_mode = mode.eq_ignore_ascii_case("on");
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                // Unknown commands, `stop` and `ponderhit` included: the search is synchronous.
            }
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> ChessResult<()> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        let value = value_tokens.join(" ");
        let bad_value = || ChessError::Config(format!("invalid {name} value '{value}'"));

        if name.eq_ignore_ascii_case("Skill Level") {
            let level = value.parse::<u8>().map_err(|_| bad_value())?;
            self.config.skill = SkillLevel::from_level(level);
            self.rebuild_adapter()?;
        } else if name.eq_ignore_ascii_case("Depth") {
            let depth = value.parse::<u8>().map_err(|_| bad_value())?;
            self.config.limit = if depth == 0 {
                SearchLimit::default()
            } else {
                SearchLimit::Depth(depth)
            };
            self.adapter.set_limit(self.config.limit);
        } else if name.eq_ignore_ascii_case("MoveTime") {
            let ms = value.parse::<u64>().map_err(|_| bad_value())?;
            self.config.limit = SearchLimit::ThinkTimeMs(ms.max(1));
            self.adapter.set_limit(self.config.limit);
        } else if name.eq_ignore_ascii_case("Oracle") {
            self.config.oracle = match value.to_ascii_lowercase().as_str() {
                "random" => OracleKind::Random,
                "greedy" => OracleKind::Greedy,
                "alphabeta" => OracleKind::AlphaBeta,
                _ => return Err(bad_value()),
            };
            self.rebuild_adapter()?;
        } else {
            return Err(ChessError::Config(format!("unknown option '{name}'")));
        }

        Ok(())
    }

    fn rebuild_adapter(&mut self) -> ChessResult<()> {
        self.adapter = EngineAdapter::from_config(self.config.clone())?;
        self.adapter.new_game();
        Ok(())
    }

    fn handle_position(&mut self, line: &str) -> ChessResult<()> {
        let mut tokens = line.split_whitespace().peekable();
        let _ = tokens.next(); // "position"

        let mut position = match tokens.next() {
            Some("startpos") => Position::starting(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(next) = tokens.next_if(|tok| *tok != "moves") {
                    fen_parts.push(next);
                }
                if fen_parts.is_empty() {
                    return Err(ChessError::InvalidFen("missing FEN after 'position fen'".to_owned()));
                }
                Position::from_fen(&fen_parts.join(" "))?
            }
            Some(other) => {
                return Err(ChessError::InvalidNotation(format!(
                    "unsupported position token '{other}'"
                )))
            }
            None => {
                return Err(ChessError::InvalidNotation("incomplete position command".to_owned()))
            }
        };

        if tokens.next_if_eq(&"moves").is_some() {
            for lan in tokens {
                let mv = parse_long_algebraic(lan, &position)?;
                position = position.play(&mv)?;
            }
        }

        self.position = position;
        Ok(())
    }

    fn handle_go(&mut self, line: &str, out: &mut impl Write) -> ChessResult<()> {
        let params = parse_go_params(line);
        let limit = resolve_search_limit(&params, self.position.side_to_move()).unwrap_or(self.config.limit);
        self.adapter.set_limit(limit);

        let control = SearchControl::new();
        control.set_node_budget(params.nodes);

        let suggested = self.adapter.suggest_move_with_control(&self.position, &control);
        self.adapter.set_limit(self.config.limit);

        if self.debug_mode {
            writeln!(out, "info nodes {}", control.nodes_visited())?;
        }
        match suggested? {
            Some(mv) => writeln!(out, "bestmove {}", mv)?,
            None => writeln!(out, "bestmove 0000")?,
        }
        Ok(())
    }
}

pub fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => params.depth = tokens.next().and_then(|x| x.parse().ok()),
            "movetime" => params.movetime_ms = tokens.next().and_then(|x| x.parse().ok()),
            "nodes" => params.nodes = tokens.next().and_then(|x| x.parse().ok()),
            "wtime" => params.wtime_ms = tokens.next().and_then(|x| x.parse().ok()),
            "btime" => params.btime_ms = tokens.next().and_then(|x| x.parse().ok()),
            "winc" => params.winc_ms = tokens.next().and_then(|x| x.parse().ok()),
            "binc" => params.binc_ms = tokens.next().and_then(|x| x.parse().ok()),
            "movestogo" => params.movestogo = tokens.next().and_then(|x| x.parse().ok()),
            _ => {}
        }
    }
    params
}

/// Limit for one `go` request. An explicit depth wins, then `movetime`, then
/// a share of the mover's clock. `None` means use the configured limit.
pub fn resolve_search_limit(params: &GoParams, side_to_move: Color) -> Option<SearchLimit> {
    if let Some(depth) = params.depth {
        return Some(SearchLimit::Depth(depth.max(1)));
    }
    if let Some(ms) = params.movetime_ms {
        return Some(SearchLimit::ThinkTimeMs(ms.max(1)));
    }
    let (remaining, inc) = match side_to_move {
        Color::White => (params.wtime_ms, params.winc_ms),
        Color::Black => (params.btime_ms, params.binc_ms),
    };
    remaining.map(|remaining| SearchLimit::ThinkTimeMs(clock_budget_ms(remaining, inc, params.movestogo)))
}

fn clock_budget_ms(remaining_ms: u64, inc_ms: Option<u64>, movestogo: Option<u16>) -> u64 {
    let moves_left = movestogo.map_or(DEFAULT_MOVES_TO_GO, |m| u64::from(m.max(1)));
    let base = remaining_ms / moves_left;
    let inc_bonus = inc_ms.unwrap_or(0).saturating_mul(3) / 4;
    let max_budget = (remaining_ms / 4).max(1);
    base.saturating_add(inc_bonus).clamp(1, max_budget)
}

#[cfg(test)]
mod tests {
    use super::{parse_go_params, resolve_search_limit, GoParams, UciState};
    use crate::engines::engine_adapter::{EngineConfig, OracleKind, SearchLimit, SkillLevel};
    use crate::game_state::chess_types::Color;
    use crate::game_state::position::Position;

    fn state() -> UciState {
        UciState::new(EngineConfig {
            seed: Some(5),
            limit: SearchLimit::Depth(1),
            ..EngineConfig::default()
        })
        .expect("built-in oracle builds")
    }

    fn run(state: &mut UciState, line: &str) -> String {
        let mut out = Vec::<u8>::new();
        state.handle_command(line, &mut out).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("UCI output is UTF-8")
    }

    #[test]
    fn uci_handshake_lists_options() {
        let mut state = state();
        let out = run(&mut state, "uci");
        assert!(out.contains("option name Skill Level"));
        assert!(out.trim_end().ends_with("uciok"));
        assert_eq!(run(&mut state, "isready"), "readyok\n");
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = state();
        state
            .handle_position("position startpos moves e2e4 e7e5 g1f3")
            .expect("position command should parse");
        assert_eq!(state.position.side_to_move(), Color::Black);
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = state();
        state
            .handle_position("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
            .expect("position fen should parse");
        assert_eq!(state.position.fen(), "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
    }

    #[test]
    fn illegal_move_in_position_keeps_previous_position() {
        let mut state = state();
        let out = run(&mut state, "position startpos moves e2e5");
        assert!(out.starts_with("info string position error"));
        assert_eq!(state.position, Position::starting());
    }

    #[test]
    fn setoption_skill_level_and_oracle_rebuild_the_adapter() {
        let mut state = state();
        state
            .handle_setoption("setoption name Skill Level value 1")
            .expect("setoption should parse");
        assert_eq!(state.config.skill, SkillLevel::Easy);

        state
            .handle_setoption("setoption name Oracle value greedy")
            .expect("setoption should parse");
        assert_eq!(state.config.oracle, OracleKind::Greedy);
        assert_eq!(state.adapter.name(), "greedy");

        assert!(state.handle_setoption("setoption name Oracle value stockfish").is_err());
        assert!(state.handle_setoption("setoption name Hash value 64").is_err());
    }

    #[test]
    fn setoption_depth_and_movetime_set_the_limit() {
        let mut state = state();
        state
            .handle_setoption("setoption name Depth value 4")
            .expect("setoption should parse");
        assert_eq!(state.config.limit, SearchLimit::Depth(4));

        state
            .handle_setoption("setoption name Depth value 0")
            .expect("setoption should parse");
        assert_eq!(state.config.limit, SearchLimit::default());

        state
            .handle_setoption("setoption name MoveTime value 250")
            .expect("setoption should parse");
        assert_eq!(state.config.limit, SearchLimit::ThinkTimeMs(250));
    }

    #[test]
    fn go_prints_a_legal_bestmove() {
        let mut state = state();
        run(&mut state, "position startpos moves e2e4");
        let out = run(&mut state, "go depth 2");
        let lan = out
            .lines()
            .find_map(|line| line.strip_prefix("bestmove "))
            .expect("bestmove line");
        let position = state.position.clone();
        crate::utils::long_algebraic::parse_long_algebraic(lan, &position).expect("bestmove is legal");
    }

    #[test]
    fn go_in_a_mated_position_reports_no_move() {
        let mut state = state();
        run(&mut state, "position startpos moves f2f3 e7e5 g2g4 d8h4");
        assert_eq!(run(&mut state, "go depth 1"), "bestmove 0000\n");
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut state = state();
        let mut out = Vec::<u8>::new();
        assert!(state.handle_command("quit", &mut out).expect("no I/O error"));
        assert!(!state.handle_command("stop", &mut out).expect("no I/O error"));
    }

    #[test]
    fn parse_go_params_reads_clock_fields() {
        let params = parse_go_params("go wtime 120000 btime 60000 winc 1000 binc 1000 movestogo 20 nodes 500");
        assert_eq!(
            params,
            GoParams {
                depth: None,
                movetime_ms: None,
                nodes: Some(500),
                wtime_ms: Some(120_000),
                btime_ms: Some(60_000),
                winc_ms: Some(1_000),
                binc_ms: Some(1_000),
                movestogo: Some(20),
            }
        );
    }

    #[test]
    fn search_limit_prefers_depth_then_movetime_then_clock() {
        let params = parse_go_params("go depth 3 movetime 100");
        assert_eq!(resolve_search_limit(&params, Color::White), Some(SearchLimit::Depth(3)));

        let params = parse_go_params("go movetime 100 wtime 5000");
        assert_eq!(
            resolve_search_limit(&params, Color::White),
            Some(SearchLimit::ThinkTimeMs(100))
        );

        // 60000 / 20 + 1000 * 3 / 4
        let params = parse_go_params("go wtime 1000 btime 60000 binc 1000 movestogo 20");
        assert_eq!(
            resolve_search_limit(&params, Color::Black),
            Some(SearchLimit::ThinkTimeMs(3_750))
        );

        assert_eq!(resolve_search_limit(&GoParams::default(), Color::White), None);
    }
}
