//! Player settings
//!
//! Read from a JSON file. Any field may be left out; missing fields take
//! their defaults, and a missing or malformed file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::InitError;
use crate::sim::breakout::consts::STARTING_LIVES;
use crate::sim::snake::SpeedLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Snake speed level, 1 (slowest) to 5 (fastest)
    pub snake_speed_level: u8,
    /// Lives at the start of a breakout game
    pub breakout_lives: u8,
    /// Fixed RNG seed; random per run when absent
    pub seed: Option<u64>,
    /// Where best scores are kept; in-memory only when absent
    pub scores_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snake_speed_level: SpeedLevel::NEUTRAL.get(),
            breakout_lives: STARTING_LIVES,
            seed: None,
            scores_path: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };
        match Self::from_json_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn speed_level(&self) -> Result<SpeedLevel, InitError> {
        SpeedLevel::new(self.snake_speed_level)
    }

    /// Starting lives, at least one
    pub fn lives(&self) -> u8 {
        self.breakout_lives.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.snake_speed_level, 3);
        assert_eq!(s.lives(), STARTING_LIVES);
        assert_eq!(s.seed, None);
        assert_eq!(s.speed_level(), Ok(SpeedLevel::NEUTRAL));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json_str(r#"{ "seed": 42, "snake_speed_level": 5 }"#).unwrap();
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.snake_speed_level, 5);
        assert_eq!(s.breakout_lives, STARTING_LIVES);
        assert_eq!(s.scores_path, None);
    }

    #[test]
    fn test_bad_speed_level_is_error() {
        let s = Settings::from_json_str(r#"{ "snake_speed_level": 9 }"#).unwrap();
        assert_eq!(s.speed_level(), Err(InitError::SpeedLevel(9)));
    }

    #[test]
    fn test_zero_lives_clamped() {
        let s = Settings::from_json_str(r#"{ "breakout_lives": 0 }"#).unwrap();
        assert_eq!(s.lives(), 1);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("arcade-trio-no-such-settings.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!(
            "arcade-trio-settings-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "[1, 2").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(path);
    }
}
