//! Oracle backed by an external UCI engine process.
//!
//! Spawns the engine, performs the `uci`/`isready` handshake, and for each
//! request sends `position fen ...` and a `go` command. Engine output is read
//! on a helper thread and forwarded over a channel so the caller can keep
//! polling the search control and send `stop` when asked to.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::engines::engine_trait::{MoveOracle, OracleReply, SearchLimits};
use crate::errors::{ChessError, ChessResult};
use crate::search::search_control::SearchControl;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct UciProcessOracle {
    name: String,
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl UciProcessOracle {
    pub fn spawn(program: &str, args: &[String]) -> ChessResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChessError::Oracle("engine stdin unavailable".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChessError::Oracle("engine stdout unavailable".to_owned()))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut oracle = Self {
            name: program.to_owned(),
            child,
            stdin,
            lines: rx,
        };

        oracle.send("uci")?;
        let mut engine_name = None;
        oracle.wait_for(HANDSHAKE_TIMEOUT, |line| {
            if let Some(name) = line.strip_prefix("id name ") {
                engine_name = Some(name.trim().to_owned());
            }
            line == "uciok"
        })?;
        if let Some(name) = engine_name {
            oracle.name = name;
        }
        oracle.sync()?;
        debug!(engine = %oracle.name, "uci engine ready");
        Ok(oracle)
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        self.send(&format!("setoption name {name} value {value}"))?;
        self.sync()
    }

    fn sync(&mut self) -> ChessResult<()> {
        self.send("isready")?;
        self.wait_for(HANDSHAKE_TIMEOUT, |line| line == "readyok")
    }

    fn send(&mut self, command: &str) -> ChessResult<()> {
        debug!(command, "to engine");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn wait_for(&mut self, timeout: Duration, mut done: impl FnMut(&str) -> bool) -> ChessResult<()> {
        let mut waited = Duration::ZERO;
        loop {
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    if done(line.trim()) {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    waited += POLL_INTERVAL;
                    if waited >= timeout {
                        return Err(ChessError::Oracle("engine did not answer in time".to_owned()));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ChessError::Oracle("engine process exited".to_owned()));
                }
            }
        }
    }
}

/// Parses the move token of a `bestmove` line. `(none)` and `0000` mean no move.
pub fn parse_bestmove_line(line: &str) -> Option<Option<String>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    match tokens.next() {
        None | Some("(none)") | Some("0000") => Some(None),
        Some(mv) => Some(Some(mv.to_owned())),
    }
}

pub fn go_command(limits: &SearchLimits) -> String {
    match (limits.depth, limits.movetime) {
        (Some(depth), Some(movetime)) => format!("go depth {depth} movetime {}", movetime.as_millis()),
        (Some(depth), None) => format!("go depth {depth}"),
        (None, Some(movetime)) => format!("go movetime {}", movetime.as_millis()),
        (None, None) => "go depth 1".to_owned(),
    }
}

impl MoveOracle for UciProcessOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_game(&mut self) {
        if let Err(err) = self.send("ucinewgame").and_then(|_| self.sync()) {
            warn!(%err, "ucinewgame failed");
        }
    }

    fn choose_move(
        &mut self,
        fen: &str,
        limits: &SearchLimits,
        control: &SearchControl,
    ) -> ChessResult<OracleReply> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&go_command(limits))?;

        let mut out = OracleReply::default();
        let mut stop_sent = false;
        loop {
            if control.stop_requested() && !stop_sent {
                self.send("stop")?;
                stop_sent = true;
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    let line = line.trim();
                    if let Some(best) = parse_bestmove_line(line) {
                        out.best_move = best;
                        return Ok(out);
                    }
                    if line.starts_with("info") {
                        out.info_lines.push(line.to_owned());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ChessError::Oracle("engine process exited during search".to_owned()));
                }
            }
        }
    }
}

impl Drop for UciProcessOracle {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{go_command, parse_bestmove_line, UciProcessOracle};
    use crate::engines::engine_trait::SearchLimits;
    use crate::errors::ChessError;

    #[test]
    fn bestmove_lines_are_parsed() {
        assert_eq!(parse_bestmove_line("bestmove e2e4 ponder e7e5"), Some(Some("e2e4".to_owned())));
        assert_eq!(parse_bestmove_line("bestmove (none)"), Some(None));
        assert_eq!(parse_bestmove_line("bestmove 0000"), Some(None));
        assert_eq!(parse_bestmove_line("info depth 3"), None);
    }

    #[test]
    fn go_command_reflects_limits() {
        assert_eq!(
            go_command(&SearchLimits { depth: Some(3), movetime: None }),
            "go depth 3"
        );
        assert_eq!(
            go_command(&SearchLimits {
                depth: None,
                movetime: Some(Duration::from_millis(250))
            }),
            "go movetime 250"
        );
    }

    #[test]
    fn missing_engine_binary_is_an_io_error() {
        let err = UciProcessOracle::spawn("definitely-not-a-chess-engine-binary", &[])
            .err()
            .expect("spawn should fail");
        assert!(matches!(err, ChessError::Io(_)));
    }
}
