//! Editor configuration persisted as JSON in the platform config directory

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tilemap_core::DEFAULT_TILE_SIZE;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Defaults used by a [`crate::TilemapEditor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tile size for new maps and for imports that omit `tileSize`
    pub default_tile_size: u32,
    /// Undo depth; `None` keeps every snapshot
    pub max_history: Option<usize>,
    /// Image name written into `tiles.json`
    pub spritesheet: String,
    /// New layers are named `"{prefix} {n}"`
    pub layer_name_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_tile_size: DEFAULT_TILE_SIZE,
            max_history: None,
            spritesheet: "tileset.png".to_string(),
            layer_name_prefix: "Layer".to_string(),
        }
    }
}

impl EditorConfig {
    /// Get the config directory path for the editor
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tilemap_editor", "tilemap_editor")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load config from the user's config directory, returning defaults on failure
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory. Using defaults.");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Could not load config from {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the user's config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to_path(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
