//! Configuration management for the Quackbox launcher
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Every section has defaults, so an empty file is a valid configuration.

pub mod watcher;

use crate::input::{KeymapConfig, LogicalButton};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub players: PlayersConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

/// Input sampling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputConfig {
    /// Snapshot sampling period
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,

    /// Poll physical gamepads through gilrs
    #[serde(default = "default_true")]
    pub physical: bool,

    /// Accept keyboard-simulated controllers
    #[serde(default)]
    pub simulated: bool,

    /// First slot given to physical gamepads (defaults to after the virtual slots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_slot_base: Option<usize>,
}

/// Player registry configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayersConfig {
    /// Delay between a disconnect and removal of the player
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,

    /// Button that marks a player connected
    #[serde(default = "default_connect_button")]
    pub connect_button: LogicalButton,
}

/// Game catalog configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Games directory (defaults to `<data dir>/games`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_dir: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval(),
            physical: true,
            simulated: false,
            physical_slot_base: None,
        }
    }
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period(),
            connect_button: default_connect_button(),
        }
    }
}

impl InputConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl PlayersConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::parse(&contents).with_context(|| format!("Invalid config file: {}", path))?;
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn parse(contents: &str) -> Result<Self> {
        // serde_yaml turns an empty document into null
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if !(10..=1000).contains(&self.input.sample_interval_ms) {
            anyhow::bail!(
                "input.sample_interval_ms must be between 10 and 1000 (got {})",
                self.input.sample_interval_ms
            );
        }
        if !self.input.physical && !self.input.simulated {
            anyhow::bail!("At least one of input.physical or input.simulated must be enabled");
        }
        if self.players.grace_period_ms > 60_000 {
            anyhow::bail!(
                "players.grace_period_ms must be at most 60000 (got {})",
                self.players.grace_period_ms
            );
        }
        if self.players.connect_button.direction().is_some() {
            anyhow::bail!(
                "players.connect_button cannot be a d-pad direction ({})",
                self.players.connect_button
            );
        }
        if let Some(dir) = &self.catalog.games_dir {
            if dir.trim().is_empty() {
                anyhow::bail!("catalog.games_dir cannot be empty");
            }
        }
        self.keymap.validate().context("Invalid keymap")?;
        Ok(())
    }

    /// First slot for physical gamepads
    pub fn physical_slot_base(&self) -> usize {
        self.input.physical_slot_base.unwrap_or(if self.input.simulated {
            self.keymap.players.len()
        } else {
            0
        })
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_sample_interval() -> u64 { 100 }
fn default_grace_period() -> u64 { 1000 }
fn default_connect_button() -> LogicalButton { LogicalButton::RightTrigger }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.input.sample_interval(), Duration::from_millis(100));
        assert_eq!(config.players.grace_period(), Duration::from_millis(1000));
        assert_eq!(config.players.connect_button, LogicalButton::RightTrigger);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
input:
  simulated: true
players:
  grace_period_ms: 1500
  connect_button: start
"#,
        )
        .unwrap();
        assert!(config.input.physical);
        assert!(config.input.simulated);
        assert_eq!(config.players.grace_period_ms, 1500);
        assert_eq!(config.players.connect_button, LogicalButton::Start);
        assert_eq!(config.physical_slot_base(), 2);
    }

    #[test]
    fn test_validation_errors() {
        assert!(AppConfig::parse("input:\n  sample_interval_ms: 1\n").is_err());
        assert!(AppConfig::parse("input:\n  physical: false\n").is_err());
        assert!(AppConfig::parse("players:\n  connect_button: up\n").is_err());
        assert!(AppConfig::parse("catalog:\n  games_dir: \"  \"\n").is_err());
        assert!(AppConfig::parse("players:\n  connect_button: turbo\n").is_err());
    }

    #[test]
    fn test_custom_keymap() {
        let config = AppConfig::parse(
            r#"
keymap:
  players:
    - { z: 1, x: 0 }
  attach: { P: 0 }
  detach: { O: 0 }
"#,
        )
        .unwrap();
        assert_eq!(config.keymap.players.len(), 1);
        assert_eq!(config.keymap.kill_switch, vec!["Escape".to_string()]);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        let path = path.to_string_lossy().to_string();

        let mut config = AppConfig::default();
        config.catalog.games_dir = Some("/srv/games".to_string());
        config.save(&path).await.unwrap();

        let loaded = AppConfig::load(&path).await.unwrap();
        assert_eq!(loaded.catalog.games_dir.as_deref(), Some("/srv/games"));
    }
}
