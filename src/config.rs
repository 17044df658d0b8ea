//! User configuration loaded from YAML.

use crate::dates::Locale;
use crate::storage::{DEFAULT_KEY, JsonFileStorage, SqliteStorage, validate_key};
use crate::store::TaskStore;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name inside the platform config directory.
const CONFIG_FILE: &str = "todocal.yml";

/// Which storage backend holds the task slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory holding `.todocal/`; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            backend: Backend::default(),
            storage_key: default_storage_key(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Default config location (`~/.config/todocal/todocal.yml` on Linux).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todocal")
            .join(CONFIG_FILE)
    }

    /// Load from `path`, or the default location when `None`. A missing file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        validate_key(&config.storage_key).context("Invalid storage_key in config")?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Open the configured backend under `root` and load the store from it.
    pub fn open_store(&self, root: &Path) -> Result<TaskStore> {
        let store = match self.backend {
            Backend::Json => TaskStore::open(
                JsonFileStorage::open(root, &self.storage_key).context("Failed to open JSON storage")?,
            ),
            Backend::Sqlite => TaskStore::open(
                SqliteStorage::open(root, &self.storage_key).context("Failed to open SQLite storage")?,
            ),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("absent.yml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "todos");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todocal.yml");
        fs::write(&path, "locale: ko\nbackend: sqlite\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.locale, Locale::Ko);
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.storage_key, "todos");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todocal.yml");
        fs::write(&path, "locale: [unterminated\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_bad_storage_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todocal.yml");
        fs::write(&path, "storage_key: ../etc\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_open_store_per_backend() {
        let temp = TempDir::new().unwrap();

        let json = Config::default();
        let mut store = json.open_store(temp.path()).unwrap();
        store.add("On disk", "2024-03-01").unwrap();
        assert!(temp.path().join(".todocal/todos.json").exists());

        let sqlite = Config {
            backend: Backend::Sqlite,
            ..Config::default()
        };
        let store = sqlite.open_store(temp.path()).unwrap();
        assert!(store.is_empty());
        assert!(temp.path().join(".todocal/todocal.db").exists());
    }
}
