//! todocal: a todo list with list and month-calendar views.
//!
//! The whole collection lives in a single key-value slot that is rewritten
//! after every change. Views (sorted list, calendar grid, export report) are
//! derived on demand and never stored.
//!
//! # Example
//!
//! ```
//! use todocal::{CalendarGrid, ExportFormatter, Locale, MemoryStorage, MonthRef, TaskStore};
//! use chrono::NaiveDate;
//!
//! let mut store = TaskStore::open(MemoryStorage::new());
//!
//! let milk = store.add("Buy milk", "2024-03-02").unwrap();
//! store.add("Pay rent", "2024-03-01").unwrap();
//! store.toggle_complete(milk.id).unwrap();
//!
//! // Sorted by due date
//! assert_eq!(store.list()[0].text, "Pay rent");
//!
//! // Month view
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let grid = CalendarGrid::build(&store, MonthRef::new(2024, 3).unwrap(), today).unwrap();
//! assert_eq!(grid.cells.len(), 42);
//!
//! // Export
//! let report = ExportFormatter::new(Locale::En)
//!     .format(store.tasks(), today.and_hms_opt(9, 0, 0).unwrap())
//!     .unwrap();
//! assert!(report.contains("Completion: 50%"));
//! ```

mod id;
mod types;

pub mod calendar;
pub mod config;
pub mod dates;
pub mod export;
pub mod storage;
pub mod store;

// Re-export public API
pub use calendar::{CalendarGrid, DayCell, GRID_CELLS, MAX_TASKS_PER_CELL};
pub use config::{Backend, Config};
pub use dates::{Locale, MonthRef, parse_date};
pub use export::{ExportError, ExportFormatter, export_filename};
pub use id::IdGenerator;
pub use storage::{JsonFileStorage, MemoryStorage, SqliteStorage, TaskStorage, decode_tasks, encode_tasks};
pub use store::{Stats, StoreError, TaskStore};
pub use types::{Task, ValidationError, sort_tasks};
