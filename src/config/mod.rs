//! # Configuration Management Module
//!
//! Riddle Rooms reads a single TOML file (default `riddlerooms.toml`). Every section
//! has defaults, so a partial file (or none at all) still yields a playable game.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Scoring rules, health, level cap, default name and room
//! - [`StorageConfig`] - Where the session and leaderboard tables live
//! - [`QuestionsConfig`] - Optional JSON riddle bank replacing the built-in riddles
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! initial_health = 50
//! health_loss = 10
//! points_per_win = 20
//! points_per_loss = 10
//! max_levels = 5
//! default_player_name = "Adventurer"
//! default_difficulty = "easy"
//!
//! [storage]
//! data_dir = "./data"
//! sessions_file = "player_sessions.csv"
//! leaderboard_file = "leaderboard.csv"
//!
//! [questions]
//! bank_file = "./data/riddles.json"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::riddle::Difficulty;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub questions: QuestionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scoring and progression rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Health at the start of every session.
    pub initial_health: u32,
    /// Health lost per wrong answer (clamped at zero).
    pub health_loss: u32,
    /// Points gained per correct answer.
    pub points_per_win: i32,
    /// Points subtracted per wrong answer.
    pub points_per_loss: i32,
    /// A session is won once the level climbs past this value.
    pub max_levels: u32,
    /// Name used when the player leaves theirs blank.
    pub default_player_name: String,
    /// Room used when no room is chosen.
    pub default_difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_health: 50,
            health_loss: 10,
            points_per_win: 20,
            points_per_loss: 10,
            max_levels: 5,
            default_player_name: "Adventurer".to_string(),
            default_difficulty: Difficulty::Easy,
        }
    }
}

impl GameConfig {
    /// Reject rule sets that would end a session before the first riddle.
    pub fn validate(&self) -> Result<()> {
        if self.initial_health == 0 {
            return Err(anyhow!("game.initial_health must be greater than 0"));
        }
        if self.max_levels == 0 {
            return Err(anyhow!("game.max_levels must be greater than 0"));
        }
        if self.default_player_name.trim().is_empty() {
            return Err(anyhow!("game.default_player_name must not be blank"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub sessions_file: String,
    pub leaderboard_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: "./data".to_string(),
            sessions_file: "player_sessions.csv".to_string(),
            leaderboard_file: "leaderboard.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionsConfig {
    /// JSON riddle bank; the built-in riddles are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown values fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.game.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists. `Ok(None)` means there is no file and the caller
    /// should fall back to [`Config::default`]; a file that exists but does not
    /// read, parse or validate is still an error.
    pub async fn load_if_present(path: &str) -> Result<Option<Self>> {
        match fs::try_exists(path).await {
            Ok(false) => Ok(None),
            Ok(true) => Self::load(path).await.map(Some),
            Err(e) => Err(anyhow!("Failed to check config file {}: {}", path, e)),
        }
    }

    /// Load an existing file untouched, or write the default one. The flag is
    /// `true` when a new file was created.
    pub async fn load_or_create(path: &str) -> Result<(Self, bool)> {
        match Self::load_if_present(path).await? {
            Some(existing) => Ok((existing, false)),
            None => Ok((Self::create_default(path).await?, true)),
        }
    }

    /// Create a default configuration file pointing at `<data_dir>/riddles.json`
    pub async fn create_default(path: &str) -> Result<Config> {
        let mut config = Config::default();
        let bank = std::path::Path::new(&config.storage.data_dir).join("riddles.json");
        config.questions.bank_file = Some(bank.to_string_lossy().into_owned());
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(config)
    }
}
