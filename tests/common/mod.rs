//! Shared test infrastructure for todocal integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use chrono::NaiveDate;
use todocal::{JsonFileStorage, MemoryStorage, StoreError, Task, TaskStore};
use tempfile::TempDir;

/// Test environment backed by an in-memory slot.
pub struct TestEnv {
    pub storage: MemoryStorage,
    pub store: TaskStore,
}

impl TestEnv {
    /// Create a new test environment with an empty store.
    pub fn new() -> Self {
        let storage = MemoryStorage::new();
        let store = TaskStore::open(storage.clone());
        Self { storage, store }
    }

    /// Add a task due on `date` (YYYY-MM-DD).
    pub fn add(&mut self, text: &str, date: &str) -> Task {
        self.store.add(text, date).expect("Failed to add task")
    }

    /// Add a task and mark it done.
    pub fn add_done(&mut self, text: &str, date: &str) -> Task {
        let task = self.add(text, date);
        self.store
            .toggle_complete(task.id)
            .expect("Failed to complete task")
    }

    /// Reload a fresh store from the same slot.
    pub fn reopen(&self) -> TaskStore {
        TaskStore::open(self.storage.clone())
    }

    /// Ids in display order.
    pub fn listed_ids(&self) -> Vec<u64> {
        self.store.list().iter().map(|t| t.id).collect()
    }

    pub fn total_count(&self) -> usize {
        self.store.len()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Test environment backed by a JSON file in a temp directory.
pub struct FileEnv {
    pub temp_dir: TempDir,
    pub store: TaskStore,
}

impl FileEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Self::open_in(&temp_dir);
        Self { temp_dir, store }
    }

    pub fn open_in(temp_dir: &TempDir) -> TaskStore {
        let storage = JsonFileStorage::open(temp_dir.path(), "todos").expect("Failed to open storage");
        TaskStore::open(storage)
    }

    pub fn reopen(&self) -> TaskStore {
        Self::open_in(&self.temp_dir)
    }
}

impl Default for FileEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand date constructor.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Extract the store error carried by a report.
pub fn store_error(report: &eyre::Report) -> StoreError {
    report
        .downcast_ref::<StoreError>()
        .cloned()
        .unwrap_or_else(|| panic!("Expected StoreError, got: {:#}", report))
}
