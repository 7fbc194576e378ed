//! Configuration file support for Microplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/microplan/config.toml`.

use crate::library::ExerciseClass;
use crate::{Error, Phase, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub library: LibraryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Drag-and-drop board behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Phase an exercise lands in when dropped on a day header
    #[serde(default)]
    pub default_phase: Phase,

    /// Most days a microcycle may hold
    #[serde(default = "default_max_days")]
    pub max_days: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_phase: Phase::default(),
            max_days: default_max_days(),
        }
    }
}

/// Custom library exercise definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomExercise {
    pub id: String,
    pub name: String,
    pub class: ExerciseClass,
}

/// Exercise library configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct LibraryConfig {
    #[serde(default)]
    pub custom: Vec<CustomExercise>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("microplan")
}

fn default_max_days() -> u32 {
    14
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("microplan")
            .join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.board.max_days == 0 {
            return Err(Error::Config("board.max_days must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.board.default_phase, Phase::Main);
        assert_eq!(config.board.max_days, 14);
        assert!(config.library.custom.is_empty());
        assert!(config.data.data_dir.ends_with("microplan"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.board.max_days, parsed.board.max_days);
        assert_eq!(config.data.data_dir, parsed.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[board]
default_phase = "warmup"

[[library.custom]]
id = "sled_push"
name = "Sled Push"
class = "cardio"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.board.default_phase, Phase::Warmup);
        assert_eq!(config.board.max_days, 14); // default
        assert_eq!(config.library.custom.len(), 1);
        assert_eq!(config.library.custom[0].class, ExerciseClass::Cardio);
    }

    #[test]
    fn test_zero_max_days_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[board]\nmax_days = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.board.max_days = 7;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.board.max_days, 7);
    }
}
