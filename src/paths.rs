//! Application path resolution
//!
//! - **Portable mode**: a `.portable` marker next to the executable keeps
//!   config, games and logs in the executable's directory.
//! - **Installed mode** (default): everything lives under the platform data
//!   directory (`~/.local/share/Quackbox`, `%APPDATA%\Quackbox`, ...).
//!
//! Debug builds started from a directory containing `quackbox.yaml` use that
//! directory instead.

use crate::config::AppConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "Quackbox";
const CONFIG_FILE: &str = "quackbox.yaml";
const PORTABLE_MARKER: &str = ".portable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Default configuration file
    pub config: PathBuf,
    /// Default games directory
    pub games_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub is_portable: bool,
}

impl AppPaths {
    /// All paths rooted at one base directory
    pub fn rooted_at(base: &Path, is_portable: bool) -> Self {
        Self {
            config: base.join(CONFIG_FILE),
            games_dir: base.join("games"),
            logs_dir: base.join("logs"),
            is_portable,
        }
    }

    /// Detect paths from the environment
    ///
    /// Runs before logging is initialized, so nothing here logs.
    pub fn detect() -> Self {
        #[cfg(debug_assertions)]
        {
            if let Ok(cwd) = std::env::current_dir() {
                if cwd.join(CONFIG_FILE).exists() {
                    return Self::rooted_at(&cwd, true);
                }
            }
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        if exe_dir.join(PORTABLE_MARKER).exists() {
            return Self::rooted_at(&exe_dir, true);
        }

        let base = dirs::data_dir().unwrap_or_else(|| exe_dir.clone()).join(APP_NAME);
        Self::rooted_at(&base, false)
    }

    /// Games directory from config, falling back to the default location
    pub fn games_dir_for(&self, config: &AppConfig) -> PathBuf {
        config
            .catalog
            .games_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.games_dir.clone())
    }

    /// Create the logs and games directories
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [&self.logs_dir, &self.games_dir] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_paths() {
        let paths = AppPaths::rooted_at(Path::new("/opt/quackbox"), true);
        assert_eq!(paths.config, PathBuf::from("/opt/quackbox/quackbox.yaml"));
        assert_eq!(paths.games_dir, PathBuf::from("/opt/quackbox/games"));
        assert!(paths.is_portable);
    }

    #[test]
    fn test_games_dir_override() {
        let paths = AppPaths::rooted_at(Path::new("/opt/quackbox"), false);
        let mut config = AppConfig::default();
        assert_eq!(paths.games_dir_for(&config), PathBuf::from("/opt/quackbox/games"));
        config.catalog.games_dir = Some("/srv/games".to_string());
        assert_eq!(paths.games_dir_for(&config), PathBuf::from("/srv/games"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp = tempfile::tempdir().unwrap();
        let paths = AppPaths::rooted_at(temp.path(), true);
        paths.ensure_directories().unwrap();
        assert!(paths.logs_dir.is_dir());
        assert!(paths.games_dir.is_dir());
    }
}
