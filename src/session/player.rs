//! Player descriptors for the two sides of a session.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engines::engine_adapter::EngineConfig;
use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Human,
    Computer(EngineConfig),
}

impl Player {
    pub fn is_human(&self) -> bool {
        matches!(self, Player::Human)
    }

    pub fn is_computer(&self) -> bool {
        matches!(self, Player::Computer(_))
    }

    pub fn engine_config(&self) -> Option<&EngineConfig> {
        match self {
            Player::Human => None,
            Player::Computer(config) => Some(config),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Human => f.write_str("Human"),
            Player::Computer(config) => write!(f, "Computer ({})", config.skill),
        }
    }
}

/// Who plays which color. The computer takes black unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub white: Player,
    pub black: Player,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            white: Player::Human,
            black: Player::Computer(EngineConfig::default()),
        }
    }
}

impl SessionConfig {
    pub fn human_vs_human() -> Self {
        Self {
            white: Player::Human,
            black: Player::Human,
        }
    }

    pub fn computer_vs_computer(white: EngineConfig, black: EngineConfig) -> Self {
        Self {
            white: Player::Computer(white),
            black: Player::Computer(black),
        }
    }

    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::engine_adapter::SkillLevel;

    #[test]
    fn computer_plays_black_by_default() {
        let config = SessionConfig::default();
        assert!(config.player(Color::White).is_human());
        assert!(config.player(Color::Black).is_computer());
    }

    #[test]
    fn session_config_reads_from_toml() {
        let config: SessionConfig = toml::from_str(
            r#"
            white = "human"

            [black.computer]
            skill = "easy"
            "#,
        )
        .expect("TOML should parse");
        assert_eq!(config.white, Player::Human);
        assert_eq!(
            config.black.engine_config().map(|c| c.skill),
            Some(SkillLevel::Easy)
        );
    }
}
