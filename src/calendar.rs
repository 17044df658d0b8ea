//! Month calendar grid: a fixed 6-week, Sunday-first layout.

use crate::dates::MonthRef;
use crate::store::TaskStore;
use crate::types::Task;
use chrono::{Datelike, Days, NaiveDate};
use eyre::{Result, eyre};

/// Cells in every grid (6 weeks of 7 days).
pub const GRID_CELLS: usize = 42;

/// Tasks shown per cell before the rest collapse into an overflow count.
pub const MAX_TASKS_PER_CELL: usize = 3;

/// One day in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,

    /// Date falls inside the requested month
    pub in_month: bool,

    pub is_today: bool,

    /// Up to `MAX_TASKS_PER_CELL` tasks, in display order
    pub tasks: Vec<Task>,

    /// How many tasks on this date were left out of `tasks`
    pub overflow: usize,
}

impl DayCell {
    pub fn total(&self) -> usize {
        self.tasks.len() + self.overflow
    }
}

/// A month laid out as 42 consecutive days starting on the Sunday on or
/// before the first of the month.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    pub month: MonthRef,
    pub cells: Vec<DayCell>,
}

impl CalendarGrid {
    /// Build the grid for `month`, marking `today` and bucketing the store's
    /// tasks by date.
    pub fn build(store: &TaskStore, month: MonthRef, today: NaiveDate) -> Result<Self> {
        let first = month
            .first_day()
            .ok_or_else(|| eyre!("Month out of range: {}", month))?;
        let offset = first.weekday().num_days_from_sunday();
        let start = first
            .checked_sub_days(Days::new(offset as u64))
            .ok_or_else(|| eyre!("Calendar start out of range for {}", month))?;

        let mut cells = Vec::with_capacity(GRID_CELLS);
        for i in 0..GRID_CELLS {
            let date = start
                .checked_add_days(Days::new(i as u64))
                .ok_or_else(|| eyre!("Calendar day out of range for {}", month))?;

            let mut tasks = store.tasks_on_date(date);
            let overflow = tasks.len().saturating_sub(MAX_TASKS_PER_CELL);
            tasks.truncate(MAX_TASKS_PER_CELL);

            cells.push(DayCell {
                date,
                in_month: month.contains(date),
                is_today: date == today,
                tasks,
                overflow,
            });
        }

        log::debug!("Built calendar grid for {} starting {}", month, start);
        Ok(Self { month, cells })
    }

    /// Rows of seven cells, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }
}
