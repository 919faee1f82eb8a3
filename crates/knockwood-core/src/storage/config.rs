//! TOML-based application configuration.
//!
//! Stores user preferences for the engines:
//! - Daily challenge count bounds
//! - Streak milestone ladder
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/knockwood/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Daily challenge generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Minimum challenges drawn per day.
    #[serde(default = "default_min_daily")]
    pub min_daily: u32,
    /// Maximum challenges drawn per day.
    #[serde(default = "default_max_daily")]
    pub max_daily: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Notify when the streak crosses a milestone.
    #[serde(default = "default_true")]
    pub streak_milestones: bool,
    /// Notify when a daily or event challenge completes.
    #[serde(default = "default_true")]
    pub challenge_completions: bool,
}

/// Streak settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Day counts that trigger a milestone event, ascending.
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u32>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/knockwood/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub challenges: ChallengeConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub streaks: StreakConfig,
}

// Default functions
fn default_min_daily() -> u32 {
    2
}
fn default_max_daily() -> u32 {
    3
}
fn default_true() -> bool {
    true
}
fn default_milestones() -> Vec<u32> {
    vec![3, 7, 14, 30, 50, 100]
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            min_daily: default_min_daily(),
            max_daily: default_max_daily(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            streak_milestones: true,
            challenge_completions: true,
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            milestones: default_milestones(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            challenges: ChallengeConfig::default(),
            notifications: NotificationsConfig::default(),
            streaks: StreakConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default file if none exists.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
        } else {
            let cfg = Self::default();
            cfg.save()?;
            Ok(cfg)
        }
    }

    /// Load from disk, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Effective daily draw bounds, clamped so min <= max and both >= 1.
    pub fn daily_draw_bounds(&self) -> (u32, u32) {
        let min = self.challenges.min_daily.max(1);
        let max = self.challenges.max_daily.max(min);
        (min, max)
    }
}
