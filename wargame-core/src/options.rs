//! GameOptions - rule and search parameters

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::{DEFAULT_DIM, MAX_DIM};
use crate::error::CoreError;
use crate::eval::Heuristic;

/// Longest allowed search time per move, in seconds
pub const MAX_TIME: f64 = 3600.0;

/// Search algorithm used by computer players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

/// Who controls each side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Both sides supplied from outside
    Manual,
    /// Attacker supplied from outside, Defender is the computer
    Attacker,
    /// Defender supplied from outside, Attacker is the computer
    Defender,
    /// Computer versus computer
    Auto,
}

impl FromStr for Algorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "minimax" | "false" => Ok(Algorithm::Minimax),
            "alpha_beta" | "alphabeta" | "true" => Ok(Algorithm::AlphaBeta),
            other => Err(CoreError::InvalidOptions(format!("unknown algorithm '{other}'"))),
        }
    }
}

impl FromStr for GameType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(GameType::Manual),
            "attacker" => Ok(GameType::Attacker),
            "defender" => Ok(GameType::Defender),
            "auto" => Ok(GameType::Auto),
            other => Err(CoreError::InvalidOptions(format!("unknown game type '{other}'"))),
        }
    }
}

/// Rule parameters carried by every game state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rules {
    pub dim: usize,
    pub max_turns: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            max_turns: 100,
        }
    }
}

/// Complete game configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub dim: usize,
    pub max_depth: u32,
    /// Informational only; the builder is bounded by time and `max_depth`
    pub min_depth: u32,
    /// Seconds allowed per computer turn
    pub max_time: f64,
    pub max_turns: u32,
    pub algorithm: Algorithm,
    pub minimax_heuristic: Heuristic,
    pub alpha_beta_heuristic: Heuristic,
    pub game_type: GameType,
    /// Seed for heuristic jitter (None = entropy)
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            max_depth: 4,
            min_depth: 2,
            max_time: 5.0,
            max_turns: 100,
            algorithm: Algorithm::AlphaBeta,
            minimax_heuristic: Heuristic::E1,
            alpha_beta_heuristic: Heuristic::E2,
            game_type: GameType::Manual,
            seed: None,
        }
    }
}

impl GameOptions {
    pub fn rules(&self) -> Rules {
        Rules {
            dim: self.dim,
            max_turns: self.max_turns,
        }
    }

    /// Heuristic used at the leaves of the configured algorithm
    pub fn leaf_heuristic(&self) -> Heuristic {
        match self.algorithm {
            Algorithm::Minimax => self.minimax_heuristic,
            Algorithm::AlphaBeta => self.alpha_beta_heuristic,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(3..=MAX_DIM).contains(&self.dim) {
            return Err(CoreError::InvalidOptions(format!(
                "dim must be within 3..={}, got {}",
                MAX_DIM, self.dim
            )));
        }
        if self.max_depth < 2 {
            return Err(CoreError::InvalidOptions(format!(
                "max_depth must be at least 2, got {}",
                self.max_depth
            )));
        }
        if !(self.max_time > 0.0 && self.max_time <= MAX_TIME) {
            return Err(CoreError::InvalidOptions(format!(
                "max_time must be within (0, {}] seconds, got {}",
                MAX_TIME, self.max_time
            )));
        }
        Ok(())
    }

    /// Load from JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options: {}", path.display()))?;
        let options: GameOptions = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse options: {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GameOptions::default();
        assert_eq!(options.dim, 5);
        assert_eq!(options.max_depth, 4);
        assert_eq!(options.max_turns, 100);
        assert_eq!(options.algorithm, Algorithm::AlphaBeta);
        assert_eq!(options.leaf_heuristic(), Heuristic::E2);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: GameOptions =
            serde_json::from_str(r#"{"max_time": 2.5, "algorithm": "minimax"}"#).unwrap();
        assert_eq!(options.max_time, 2.5);
        assert_eq!(options.algorithm, Algorithm::Minimax);
        assert_eq!(options.leaf_heuristic(), Heuristic::E1);
        assert_eq!(options.dim, 5);
    }

    #[test]
    fn test_validation() {
        let mut options = GameOptions::default();
        options.dim = 20;
        assert!(options.validate().is_err());

        let mut options = GameOptions::default();
        options.max_time = 0.0;
        assert!(options.validate().is_err());

        let mut options = GameOptions::default();
        options.max_depth = 1;
        assert!(options.validate().is_err());

        for max_time in [f64::INFINITY, f64::NAN, MAX_TIME + 1.0] {
            let options = GameOptions {
                max_time,
                ..GameOptions::default()
            };
            assert!(options.validate().is_err(), "{max_time}");
        }
        let options = GameOptions {
            max_time: MAX_TIME,
            ..GameOptions::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("alpha-beta".parse::<Algorithm>().unwrap(), Algorithm::AlphaBeta);
        assert_eq!("false".parse::<Algorithm>().unwrap(), Algorithm::Minimax);
        assert_eq!("Auto".parse::<GameType>().unwrap(), GameType::Auto);
        assert!("chess".parse::<GameType>().is_err());
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join(format!("wargame-options-{}.json", std::process::id()));
        let mut options = GameOptions::default();
        options.seed = Some(7);
        options.game_type = GameType::Auto;
        options.save(&path).unwrap();

        let loaded = GameOptions::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, options);
    }
}
