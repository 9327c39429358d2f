//! Game catalog and leaderboards
//!
//! The launcher reads installed games from a games directory: one
//! sub-directory per game holding `game-metadata.json` and optionally
//! `leaderboard.json`. Games are launched by spawning their `exec` entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const METADATA_FILE: &str = "game-metadata.json";
pub const LEADERBOARD_FILE: &str = "leaderboard.json";

const COVER_EXTENSIONS: [&str; 3] = ["png", "jpg", "webp"];

/// Title used by placeholder entries; sorting keeps them last
pub const COMING_SOON: &str = "coming soon";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Directory name under the games directory
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub multiplayer: bool,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, alias = "coverImagePath")]
    pub cover_image: Option<PathBuf>,
    #[serde(default)]
    pub times_played: u64,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exec: String,
    #[serde(skip)]
    pub dir: PathBuf,
}

impl GameRecord {
    pub fn is_placeholder(&self) -> bool {
        self.title.to_lowercase() == COMING_SOON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub value: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Metric name → scores
pub type Leaderboard = BTreeMap<String, Vec<LeaderboardEntry>>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Game '{id}' has no launchable executable at {path}")]
    MissingExecutable { id: String, path: PathBuf },

    #[error("Game '{0}' runs in a browser and cannot be launched here")]
    WebGame(String),

    #[error("Failed to launch '{id}': {source}")]
    Launch {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Backend boundary consumed by the shell
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_game_catalog(&self) -> Result<Vec<GameRecord>, CatalogError>;

    async fn get_leaderboard(&self, game_title: &str) -> Result<Leaderboard, CatalogError>;

    async fn launch_game(&self, id: &str) -> Result<(), CatalogError>;
}

/// Catalog backed by a local games directory
pub struct LocalCatalog {
    games_dir: PathBuf,
    games: RwLock<Vec<GameRecord>>,
}

impl LocalCatalog {
    pub fn new(games_dir: impl Into<PathBuf>) -> Self {
        Self {
            games_dir: games_dir.into(),
            games: RwLock::new(Vec::new()),
        }
    }

    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }

    async fn read_record(dir: &Path) -> Result<Option<GameRecord>, CatalogError> {
        let path = dir.join(METADATA_FILE);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
        let mut record: GameRecord =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse { path, source })?;

        record.id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        record.dir = dir.to_path_buf();
        record.cover_image = record
            .cover_image
            .map(|cover| dir.join(cover))
            .filter(|cover| {
                cover
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| COVER_EXTENSIONS.contains(&ext))
                    && cover.exists()
            });
        Ok(Some(record))
    }

    fn find(&self, predicate: impl Fn(&GameRecord) -> bool) -> Option<GameRecord> {
        self.games.read().iter().find(|g| predicate(g)).cloned()
    }
}

#[async_trait]
impl Catalog for LocalCatalog {
    async fn get_game_catalog(&self) -> Result<Vec<GameRecord>, CatalogError> {
        tokio::fs::create_dir_all(&self.games_dir)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.games_dir.clone(),
                source,
            })?;
        let mut entries = tokio::fs::read_dir(&self.games_dir)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.games_dir.clone(),
                source,
            })?;

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| CatalogError::Io {
            path: self.games_dir.clone(),
            source,
        })? {
            dirs.push(entry.path());
        }
        // read_dir order is platform dependent
        dirs.sort();

        let mut games = Vec::new();
        for dir in dirs {
            match Self::read_record(&dir).await {
                Ok(Some(record)) => {
                    debug!("Loaded game '{}' from {}", record.title, dir.display());
                    games.push(record);
                },
                Ok(None) => {},
                Err(e) => warn!("Skipping game entry: {}", e),
            }
        }

        info!("Catalog: {} game(s) in {}", games.len(), self.games_dir.display());
        *self.games.write() = games.clone();
        Ok(games)
    }

    async fn get_leaderboard(&self, game_title: &str) -> Result<Leaderboard, CatalogError> {
        let game = self
            .find(|g| g.title == game_title)
            .ok_or_else(|| CatalogError::UnknownGame(game_title.to_string()))?;

        let path = game.dir.join(LEADERBOARD_FILE);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Leaderboard::new());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse { path, source })
    }

    async fn launch_game(&self, id: &str) -> Result<(), CatalogError> {
        let game = self
            .find(|g| g.id == id)
            .ok_or_else(|| CatalogError::UnknownGame(id.to_string()))?;

        if game.exec.starts_with("http://") || game.exec.starts_with("https://") {
            return Err(CatalogError::WebGame(game.exec));
        }

        let executable = game.dir.join(&game.exec);
        if game.exec.is_empty() || !executable.exists() {
            return Err(CatalogError::MissingExecutable {
                id: game.id,
                path: executable,
            });
        }

        let child = tokio::process::Command::new(&executable)
            .current_dir(&game.dir)
            .spawn()
            .map_err(|source| CatalogError::Launch {
                id: game.id.clone(),
                source,
            })?;
        info!("Launched '{}' (pid {:?})", game.title, child.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_game(root: &Path, dir: &str, metadata: &str) -> PathBuf {
        let game_dir = root.join(dir);
        fs::create_dir_all(&game_dir).unwrap();
        fs::write(game_dir.join(METADATA_FILE), metadata).unwrap();
        game_dir
    }

    const DUCK_HUNT: &str = r#"{
        "title": "Duck Hunt",
        "author": "Quackbox",
        "summary": "Hunt ducks",
        "release_date": "2024-04-01",
        "multiplayer": true,
        "genres": ["arcade"],
        "cover_image": "cover.png",
        "times_played": 3,
        "last_played": 1712000000,
        "exec": "run.sh"
    }"#;

    #[tokio::test]
    async fn test_catalog_reads_metadata() {
        let temp = tempfile::tempdir().unwrap();
        let game_dir = write_game(temp.path(), "duck-hunt", DUCK_HUNT);
        fs::write(game_dir.join("cover.png"), b"png").unwrap();

        let catalog = LocalCatalog::new(temp.path());
        let games = catalog.get_game_catalog().await.unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "duck-hunt");
        assert_eq!(games[0].genres, vec!["arcade".to_string()]);
        assert_eq!(games[0].cover_image, Some(game_dir.join("cover.png")));
        assert!(games[0].last_played.is_some());
    }

    #[tokio::test]
    async fn test_missing_cover_and_bad_entries_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        write_game(temp.path(), "a-duck", DUCK_HUNT);
        write_game(temp.path(), "broken", "{ not json");
        fs::create_dir_all(temp.path().join("empty-dir")).unwrap();

        let catalog = LocalCatalog::new(temp.path());
        let games = catalog.get_game_catalog().await.unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].cover_image, None);
    }

    #[tokio::test]
    async fn test_leaderboard_lookup() {
        let temp = tempfile::tempdir().unwrap();
        let game_dir = write_game(temp.path(), "duck-hunt", DUCK_HUNT);
        fs::write(
            game_dir.join(LEADERBOARD_FILE),
            r#"{"score": [{"username": "mallard", "value": 120}]}"#,
        )
        .unwrap();

        let catalog = LocalCatalog::new(temp.path());
        catalog.get_game_catalog().await.unwrap();

        let board = catalog.get_leaderboard("Duck Hunt").await.unwrap();
        assert_eq!(board["score"][0].username, "mallard");
        assert!(matches!(
            catalog.get_leaderboard("Goose Chase").await,
            Err(CatalogError::UnknownGame(_))
        ));
    }

    #[tokio::test]
    async fn test_launch_rejects_missing_executable() {
        let temp = tempfile::tempdir().unwrap();
        write_game(temp.path(), "duck-hunt", DUCK_HUNT);
        let catalog = LocalCatalog::new(temp.path());
        catalog.get_game_catalog().await.unwrap();

        assert!(matches!(
            catalog.launch_game("duck-hunt").await,
            Err(CatalogError::MissingExecutable { .. })
        ));
        assert!(matches!(
            catalog.launch_game("nope").await,
            Err(CatalogError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_placeholder_detection() {
        let record: GameRecord = serde_json::from_str(r#"{"title": "Coming Soon"}"#).unwrap();
        assert!(record.is_placeholder());
    }

    #[test]
    fn test_cover_image_path_alias() {
        let record: GameRecord =
            serde_json::from_str(r#"{"title": "X", "coverImagePath": "x.jpg"}"#).unwrap();
        assert_eq!(record.cover_image, Some(PathBuf::from("x.jpg")));
    }
}
