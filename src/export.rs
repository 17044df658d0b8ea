//! Plain-text export report.
//!
//! Tasks are grouped under one heading per due date, oldest first, each
//! group numbered from 1, followed by a completion summary.

use crate::dates::{DATE_FORMAT, Locale};
use crate::store::Stats;
use crate::types::{Task, sort_tasks};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Errors from building a report.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    /// There is nothing to export.
    Empty,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Empty => write!(f, "no tasks to export"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Turns a task collection into a human-readable report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportFormatter {
    locale: Locale,
}

impl ExportFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Render the report as of `generated_at`; relative date labels are
    /// computed against that timestamp's date.
    pub fn format(&self, tasks: &[Task], generated_at: NaiveDateTime) -> Result<String, ExportError> {
        if tasks.is_empty() {
            return Err(ExportError::Empty);
        }

        let today = generated_at.date();
        let labels = ReportLabels::for_locale(self.locale);

        let mut sorted = tasks.to_vec();
        sort_tasks(&mut sorted);

        let mut groups: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
        for task in &sorted {
            groups.entry(task.date).or_default().push(task);
        }

        let rule = "=".repeat(40);
        let mut lines = vec![
            labels.title.to_string(),
            format!("{}: {}", labels.generated, generated_at.format("%Y-%m-%d %H:%M")),
            rule.clone(),
        ];

        for (date, group) in &groups {
            lines.push(String::new());
            lines.push(format!(
                "[{}] {}",
                self.locale.display_date(*date, today),
                date.format(DATE_FORMAT)
            ));
            for (i, task) in group.iter().enumerate() {
                lines.push(format!("  {}. {} [{}]", i + 1, task.text, self.locale.status(task.completed)));
            }
        }

        let stats = Stats::of(tasks);
        lines.push(String::new());
        lines.push(rule);
        lines.push(labels.summary.to_string());
        lines.push(format!("  {}: {}", labels.total, stats.total));
        lines.push(format!("  {}: {}", labels.completed, stats.completed));
        lines.push(format!("  {}: {}", labels.pending, stats.pending));
        lines.push(format!("  {}: {}%", labels.rate, stats.percent_complete().unwrap_or(0)));

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

struct ReportLabels {
    title: &'static str,
    generated: &'static str,
    summary: &'static str,
    total: &'static str,
    completed: &'static str,
    pending: &'static str,
    rate: &'static str,
}

impl ReportLabels {
    fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                title: "Todo List",
                generated: "Generated",
                summary: "Summary",
                total: "Total",
                completed: "Completed",
                pending: "Pending",
                rate: "Completion",
            },
            Locale::Ko => Self {
                title: "할 일 목록",
                generated: "생성일시",
                summary: "요약",
                total: "전체",
                completed: "완료",
                pending: "미완료",
                rate: "완료율",
            },
        }
    }
}

/// Download filename for a report generated on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("todos-{}.txt", date.format(DATE_FORMAT))
}
