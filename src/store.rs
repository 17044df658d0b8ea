//! High-level store API for todocal.

use crate::dates::parse_date;
use crate::id::IdGenerator;
use crate::storage::TaskStorage;
use crate::types::{Task, ValidationError, normalize_text, sort_tasks};
use chrono::{NaiveDate, Utc};
use eyre::{Context, Result};
use std::collections::HashSet;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No task with this id.
    NotFound(u64),
    /// Input rejected before touching the collection.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "task not found: {}", id),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e)
    }
}

/// Completion counts over a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Stats {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }

    /// Completed share rounded to the nearest whole percent; `None` when empty.
    pub fn percent_complete(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some((self.completed as f64 * 100.0 / self.total as f64).round() as u32)
    }
}

/// The task collection plus the slot it is persisted to.
///
/// Every mutation persists before returning. The next collection is built
/// aside, saved, and only then swapped in, so a failed save leaves memory
/// exactly as it was.
pub struct TaskStore {
    storage: Box<dyn TaskStorage>,
    tasks: Vec<Task>,
    ids: IdGenerator,
}

impl TaskStore {
    /// Load the collection from `storage`. Missing or unreadable data starts
    /// an empty collection.
    pub fn open(storage: impl TaskStorage + 'static) -> Self {
        let loaded = match storage.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!("Failed to load stored tasks, starting empty: {:#}", e);
                Vec::new()
            }
        };

        let tasks = sanitize(loaded);
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        log::info!("Loaded {} tasks", tasks.len());

        Self {
            storage: Box::new(storage),
            tasks,
            ids: IdGenerator::seeded(max_id),
        }
    }

    /// Add a task from raw user input. `date` must be `YYYY-MM-DD`.
    pub fn add(&mut self, text: &str, date: &str) -> Result<Task> {
        let text = normalize_text(text).map_err(invalid)?;
        let date = parse_date(date).map_err(invalid)?;
        self.insert(text, date)
    }

    /// Add a task for an already-parsed date.
    pub fn add_on(&mut self, text: &str, date: NaiveDate) -> Result<Task> {
        let text = normalize_text(text).map_err(invalid)?;
        self.insert(text, date)
    }

    fn insert(&mut self, text: String, date: NaiveDate) -> Result<Task> {
        let now = Utc::now();
        let id = self.ids.next(now.timestamp_millis().max(0) as u64);

        let task = Task {
            id,
            text,
            date,
            completed: false,
            created_at: now,
        };

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next).context("Failed to persist new task")?;

        log::debug!("Added task {} for {}", task.id, task.date);
        Ok(task)
    }

    /// Remove a task. Returns false (and writes nothing) if the id is unknown.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        if !self.tasks.iter().any(|t| t.id == id) {
            return Ok(false);
        }

        let next: Vec<Task> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next).context("Failed to persist removal")?;

        log::debug!("Removed task {}", id);
        Ok(true)
    }

    /// Flip a task's completed flag.
    pub fn toggle_complete(&mut self, id: u64) -> Result<Task> {
        self.modify(id, |task| task.completed = !task.completed)
            .context("Failed to toggle task")
    }

    /// Replace a task's text.
    pub fn edit(&mut self, id: u64, new_text: &str) -> Result<Task> {
        let text = normalize_text(new_text).map_err(invalid)?;
        self.modify(id, |task| task.text = text).context("Failed to edit task")
    }

    fn modify(&mut self, id: u64, change: impl FnOnce(&mut Task)) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| eyre::eyre!(StoreError::NotFound(id)))?;

        let mut next = self.tasks.clone();
        change(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next)?;

        Ok(updated)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        self.storage.save(&next)?;
        self.tasks = next;
        Ok(())
    }

    /// Get a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks in display order (date, then creation time).
    pub fn list(&self) -> Vec<Task> {
        let mut sorted = self.tasks.clone();
        sort_tasks(&mut sorted);
        sorted
    }

    /// Tasks due on `date`, in display order.
    pub fn tasks_on_date(&self, date: NaiveDate) -> Vec<Task> {
        self.list().into_iter().filter(|t| t.date == date).collect()
    }

    /// Tasks in insertion (storage) order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.tasks)
    }
}

fn invalid(e: ValidationError) -> eyre::Report {
    eyre::eyre!(StoreError::from(e))
}

/// Drop stored entries that would break the collection's invariants.
fn sanitize(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| {
            if let Err(e) = task.validate() {
                log::warn!("Dropping stored task {}: {}", task.id, e);
                return false;
            }
            if !seen.insert(task.id) {
                log::warn!("Dropping stored task with duplicate id {}", task.id);
                return false;
            }
            true
        })
        .collect()
}
