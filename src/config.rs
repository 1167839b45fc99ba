//! Game configuration persisted as TOML
//!
//! Stored in ~/.config/tetrs/config.toml (or platform equivalent)

use crate::score::Difficulty;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Construction-time settings for a controller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Scoring difficulty (also shapes the piece distribution)
    pub difficulty: Difficulty,
    /// Whether item pieces are generated
    pub item_mode: bool,
    /// Fixed random seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn difficulty_multiplier(&self) -> f64 {
        self.difficulty.multiplier()
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrs", "tetrs").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load the configuration from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save the configuration to file
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = Self::config_dir() else {
            return Err("Could not determine config directory".to_string());
        };

        let Some(path) = Self::config_path() else {
            return Err("Could not determine config path".to_string());
        };

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {}", e))?;

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(&path, contents).map_err(|e| format!("Failed to write config: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.difficulty, Difficulty::Normal);
        assert!(!config.item_mode);
        assert_eq!(config.seed, None);
        assert_eq!(config.difficulty_multiplier(), 1.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = GameConfig::from_toml_str("difficulty = \"hard\"\n").unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(!config.item_mode);
        assert_eq!(config.difficulty_multiplier(), 1.1);
    }

    #[test]
    fn test_full_file() {
        let config =
            GameConfig::from_toml_str("difficulty = \"easy\"\nitem_mode = true\nseed = 42\n")
                .unwrap();
        assert_eq!(
            config,
            GameConfig {
                difficulty: Difficulty::Easy,
                item_mode: true,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn test_rejects_unknown_difficulty() {
        assert!(GameConfig::from_toml_str("difficulty = \"insane\"\n").is_err());
    }

    #[test]
    fn test_written_form_parses_back() {
        let config = GameConfig {
            difficulty: Difficulty::Hard,
            item_mode: true,
            seed: None,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("difficulty = \"hard\""));
        assert_eq!(GameConfig::from_toml_str(&text).unwrap(), config);
    }
}
