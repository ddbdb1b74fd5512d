//! Application configuration loaded from a TOML file.
//!
//! ```toml
//! [session]
//! white = "human"
//!
//! [session.black.computer]
//! skill = "hard"
//! limit = { think_time_ms = 500 }
//!
//! [engine]
//! oracle = { kind = "greedy" }
//! ```
//!
//! `[session]` picks the players for interactive and self-play sessions;
//! `[engine]` configures the engine exposed over UCI.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engines::engine_adapter::EngineConfig;
use crate::errors::{ChessError, ChessResult};
use crate::session::player::SessionConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Read the configuration at `path`. No path, or a path that does not
    /// exist, yields the defaults.
    pub fn load(path: Option<&Path>) -> ChessResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::parse(&text)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(text: &str) -> ChessResult<Self> {
        toml::from_str(text).map_err(|err| ChessError::Config(err.to_string()))
    }
}
