//! Storage layer for todocal: one key-value slot holding the whole collection.
//!
//! Every backend stores the collection as a single JSON array blob under a
//! string key and overwrites it in full on each save.

use crate::types::Task;
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Storage directory name.
pub const TODOCAL_DIR: &str = ".todocal";

/// Default slot key.
pub const DEFAULT_KEY: &str = "todos";

/// SQLite database file.
const DB_FILE: &str = "todocal.db";

/// A place to load and save the task collection.
pub trait TaskStorage {
    /// Read the whole collection. A slot that was never written is empty.
    fn load(&self) -> Result<Vec<Task>>;

    /// Overwrite the slot with the given collection.
    fn save(&mut self, tasks: &[Task]) -> Result<()>;
}

/// Serialize the collection to the slot format.
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize tasks")
}

/// Parse a slot blob back into tasks.
pub fn decode_tasks(blob: &str) -> Result<Vec<Task>> {
    serde_json::from_str(blob).context("Failed to parse stored tasks")
}

/// Check a slot key is usable as a file stem and a table key.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

/// One JSON file per slot: `<root>/.todocal/<key>.json`.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Open (creating the storage directory if needed) the slot `key` under `root`.
    pub fn open(root: &Path, key: &str) -> Result<Self> {
        validate_key(key)?;
        let dir = root.join(TODOCAL_DIR);
        fs::create_dir_all(&dir).context("Failed to create .todocal directory")?;
        Ok(Self {
            path: dir.join(format!("{}.json", key)),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let blob = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode_tasks(&blob)
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let blob = encode_tasks(tasks)?;

        // Write beside the target and rename so readers never see a partial blob
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path).context("Failed to create temp slot file")?;
        file.write_all(blob.as_bytes())
            .context("Failed to write temp slot file")?;
        file.sync_all().context("Failed to sync temp slot file")?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        log::debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }
}

/// Slots as rows of a `kv` table in `<root>/.todocal/todocal.db`.
pub struct SqliteStorage {
    db: Connection,
    key: String,
}

impl SqliteStorage {
    /// Open (creating if needed) the database under `root` and bind to slot `key`.
    pub fn open(root: &Path, key: &str) -> Result<Self> {
        validate_key(key)?;
        let dir = root.join(TODOCAL_DIR);
        fs::create_dir_all(&dir).context("Failed to create .todocal directory")?;

        let db = Connection::open(dir.join(DB_FILE)).context("Failed to open SQLite database")?;
        let storage = Self {
            db,
            key: key.to_string(),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory(key: &str) -> Result<Self> {
        validate_key(key)?;
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let storage = Self {
            db,
            key: key.to_string(),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "#,
            )
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Raw blob stored in this slot, if any.
    pub fn raw(&self) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?", params![self.key], |row| row.get(0))
            .optional()
            .context("Failed to read storage slot")?;
        Ok(value)
    }
}

impl TaskStorage for SqliteStorage {
    fn load(&self) -> Result<Vec<Task>> {
        match self.raw()? {
            Some(blob) => decode_tasks(&blob),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let blob = encode_tasks(tasks)?;
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
                params![self.key, blob],
            )
            .context("Failed to write storage slot")?;
        log::debug!("Saved {} tasks to slot {}", tasks.len(), self.key);
        Ok(())
    }
}

/// In-process slot. Clones share the same slot, so a test can keep a handle
/// after moving one into a store.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary (possibly corrupt) blob in the slot.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let storage = Self::default();
        if let Ok(mut slot) = storage.blob.lock() {
            *slot = Some(blob.into());
        }
        storage
    }

    /// Current blob in the slot.
    pub fn blob(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|slot| slot.clone())
    }

    /// Make subsequent saves fail, to exercise rollback paths.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl TaskStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Task>> {
        let slot = self.blob.lock().map_err(|_| eyre!("Memory slot lock poisoned"))?;
        match slot.as_deref() {
            Some(blob) => decode_tasks(blob),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(eyre!("Memory slot is read-only"));
        }
        let blob = encode_tasks(tasks)?;
        let mut slot = self.blob.lock().map_err(|_| eyre!("Memory slot lock poisoned"))?;
        *slot = Some(blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: 1_709_283_600_000,
                text: "Buy milk".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                completed: false,
                created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            },
            Task {
                id: 1_709_283_600_001,
                text: "Call mom".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                completed: true,
                created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            },
        ]
    }

    #[test]
    fn test_json_file_missing_loads_empty() {
        let temp = TempDir::new().unwrap();
        let storage = JsonFileStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        assert!(storage.load().unwrap().is_empty());
        assert!(temp.path().join(".todocal").is_dir());
    }

    #[test]
    fn test_json_file_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        storage.save(&sample_tasks()).unwrap();

        assert!(temp.path().join(".todocal/todos.json").exists());
        assert!(!temp.path().join(".todocal/todos.json.tmp").exists());

        let reopened = JsonFileStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        assert_eq!(reopened.load().unwrap(), sample_tasks());
    }

    #[test]
    fn test_json_file_overwrites_in_full() {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        storage.save(&sample_tasks()).unwrap();
        storage.save(&sample_tasks()[..1]).unwrap();
        assert_eq!(storage.load().unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_corrupt_is_error() {
        let temp = TempDir::new().unwrap();
        let storage = JsonFileStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        fs::write(storage.path(), "{not json").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_sqlite_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        assert!(storage.load().unwrap().is_empty());
        storage.save(&sample_tasks()).unwrap();
        drop(storage);

        let reopened = SqliteStorage::open(temp.path(), DEFAULT_KEY).unwrap();
        assert_eq!(reopened.load().unwrap(), sample_tasks());
    }

    #[test]
    fn test_sqlite_slots_are_independent() {
        let temp = TempDir::new().unwrap();
        let mut work = SqliteStorage::open(temp.path(), "work").unwrap();
        work.save(&sample_tasks()).unwrap();

        let home = SqliteStorage::open(temp.path(), "home").unwrap();
        assert!(home.load().unwrap().is_empty());
        assert!(home.raw().unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_shared_handle() {
        let handle = MemoryStorage::new();
        let mut storage = handle.clone();
        storage.save(&sample_tasks()).unwrap();
        assert!(handle.blob().unwrap().contains("\"createdAt\""));
        assert_eq!(handle.load().unwrap().len(), 2);
    }

    #[test]
    fn test_memory_storage_fail_saves() {
        let mut storage = MemoryStorage::new();
        storage.set_fail_saves(true);
        assert!(storage.save(&sample_tasks()).is_err());
        assert!(storage.blob().is_none());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("work-list_2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(&"k".repeat(65)).is_err());
    }
}
