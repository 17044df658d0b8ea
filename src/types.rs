//! Core data types for todocal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single todo entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, timestamp-derived and strictly increasing
    pub id: u64,

    /// What needs doing (trimmed, never empty)
    pub text: String,

    /// Day the task is due (no time component)
    pub date: NaiveDate,

    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,

    /// When created; only used to order tasks sharing a date
    pub created_at: DateTime<Utc>,
}

/// Validation errors for task input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyText,
    MissingDate,
    InvalidDate(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyText => write!(f, "task text cannot be empty"),
            ValidationError::MissingDate => write!(f, "task date is required"),
            ValidationError::InvalidDate(raw) => {
                write!(f, "invalid date '{}': expected YYYY-MM-DD", raw)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl Task {
    /// Validate the task's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }

    /// Display ordering: due date first, creation time breaks ties.
    pub fn display_order(&self, other: &Task) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Sort tasks into display order. The sort is stable, so tasks that tie on
/// both date and creation time keep their relative order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.display_order(b));
}

/// Trim user input, rejecting text that is empty once trimmed.
pub fn normalize_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_task(id: u64, text: &str, date: &str, created_secs: i64) -> Task {
        Task {
            id,
            text: text.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            completed: false,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_task_validation_valid() {
        let task = make_task(1, "Buy milk", "2024-03-01", 0);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_task_validation_whitespace_text() {
        let task = make_task(1, "   \t", "2024-03-01", 0);
        assert_eq!(task.validate(), Err(ValidationError::EmptyText));
    }

    #[test]
    fn test_normalize_text_trims() {
        assert_eq!(normalize_text("  call mom \n").unwrap(), "call mom");
        assert_eq!(normalize_text(""), Err(ValidationError::EmptyText));
        assert_eq!(normalize_text("   "), Err(ValidationError::EmptyText));
    }

    #[test]
    fn test_sort_by_date_then_created_at() {
        let mut tasks = vec![
            make_task(1, "later date", "2024-03-02", 10),
            make_task(2, "same day, created later", "2024-03-01", 30),
            make_task(3, "same day, created first", "2024-03-01", 20),
        ];
        sort_tasks(&mut tasks);
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_is_stable_on_full_ties() {
        let mut tasks = vec![
            make_task(7, "first", "2024-03-01", 5),
            make_task(8, "second", "2024-03-01", 5),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].id, 7);
        assert_eq!(tasks[1].id, 8);
    }

    #[test]
    fn test_serialized_field_names() {
        let task = make_task(1700000000000, "Buy milk", "2024-03-01", 0);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 1700000000000u64);
        assert_eq!(json["text"], "Buy milk");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["completed"], false);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_deserialize_browser_blob_entry() {
        let raw = r#"{"id":1709283600000,"text":"Water plants","date":"2024-03-01","completed":true,"createdAt":"2024-03-01T09:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.id, 1709283600000);
        assert!(task.completed);
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(ValidationError::EmptyText.to_string(), "task text cannot be empty");
        assert_eq!(
            ValidationError::InvalidDate("03/01".to_string()).to_string(),
            "invalid date '03/01': expected YYYY-MM-DD"
        );
    }
}
